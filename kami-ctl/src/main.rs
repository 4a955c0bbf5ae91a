use std::io::BufRead;

use anyhow::Context;
use kami_client::{
    api::{AuthToken, CommentId, NewComment, TargetId},
    friends, ClientConfig, CommentThread, HttpApi, NoticeLevel, PlainRenderer, RenderContext, Renderer,
    ThreadConfig,
};

#[derive(structopt::StructOpt)]
struct Opt {
    /// Base URL of the API, eg. https://api.example.org/v2
    #[structopt(short, long, env = "KAMI_HOST")]
    host: String,

    /// Owner token, anonymous if absent
    #[structopt(long, env = "KAMI_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Name of the site owner, to flag their comments
    #[structopt(long)]
    owner_name: Option<String>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Show the comments of a post, note or page
    List {
        target: String,

        #[structopt(long, default_value = "1")]
        page: u32,

        #[structopt(long, default_value = "10")]
        size: u32,
    },

    /// Comment on a post, note or page
    Comment {
        target: String,
        text: String,

        #[structopt(flatten)]
        who: Who,
    },

    /// Reply to a comment
    Reply {
        target: String,
        parent: String,
        text: String,

        #[structopt(flatten)]
        who: Who,
    },

    /// Delete a comment and its replies
    Delete {
        target: String,
        id: String,

        /// Page the comment is on
        #[structopt(long, default_value = "1")]
        page: u32,

        /// Do not ask for confirmation
        #[structopt(long)]
        yes: bool,
    },

    /// Show a random pick of the site's friends
    Friends,
}

#[derive(structopt::StructOpt)]
struct Who {
    /// Display name, needed unless logged in as the owner
    #[structopt(long)]
    author: Option<String>,

    #[structopt(long)]
    mail: Option<String>,

    #[structopt(long)]
    url: Option<String>,
}

impl Who {
    fn comment(self, text: String) -> NewComment {
        NewComment {
            author: self.author,
            mail: self.mail,
            url: self.url,
            text,
        }
    }
}

fn print_thread(thread: &CommentThread<HttpApi>) {
    let view = thread.view();
    if view.is_empty {
        println!("no comments yet");
        return;
    }
    let ctx = RenderContext::new(thread.tree());
    for (depth, row) in view.iter() {
        let indent = "  ".repeat(depth);
        let c = &row.comment;
        let mut header = format!("{indent}[{}]", c.id);
        if let Some(key) = &c.key {
            header += &format!(" {key}");
        }
        header += &format!(" {}", c.author);
        if row.is_author {
            header += " (owner)";
        }
        if let Some(link) = &row.author_link {
            header += &format!(" <{link}>");
        }
        header += &format!(", {}", c.created_at.format("%Y-%m-%d %H:%M"));
        println!("{header}");
        for line in PlainRenderer.render(&row.text, &ctx.for_comment(c)).lines() {
            println!("{indent}  {line}");
        }
    }
    if view.has_more {
        println!("(more on the next page)");
    }
}

fn print_notices(thread: &mut CommentThread<HttpApi>) {
    for n in thread.take_notices() {
        match n.level {
            NoticeLevel::Success => println!("{}", n.message),
            NoticeLevel::Error => eprintln!("error: {}", n.message),
        }
    }
}

fn ask_confirmation(id: &CommentId) -> anyhow::Result<bool> {
    eprint!("really delete {id} and its replies? [y/N] ");
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("reading confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = <Opt as structopt::StructOpt>::from_args();

    let client = ClientConfig {
        host: opt.host,
        token: opt.token.map(AuthToken),
    };
    let is_owner = client.is_owner();
    tracing::debug!(host = %client.host, is_owner, "using comment api");
    let config = ThreadConfig {
        owner_name: opt.owner_name,
        ..ThreadConfig::default()
    };
    let open_thread = |target: String| {
        CommentThread::new(TargetId(target), HttpApi::new(client.clone()), config.clone())
            .with_owner(is_owner)
    };

    match opt.cmd {
        Command::List { target, page, size } => {
            let mut thread = open_thread(target);
            thread.load_page(page, size, true).await?;
            print_thread(&thread);
        }
        Command::Comment { target, text, who } => {
            let mut thread = open_thread(target);
            let res = thread.submit_comment(who.comment(text)).await;
            print_notices(&mut thread);
            res?;
            print_thread(&thread);
        }
        Command::Reply {
            target,
            parent,
            text,
            who,
        } => {
            let mut thread = open_thread(target);
            let res = thread
                .submit_reply(CommentId(parent), who.comment(text))
                .await;
            print_notices(&mut thread);
            res?;
            print_thread(&thread);
        }
        Command::Delete {
            target,
            id,
            page,
            yes,
        } => {
            let mut thread = open_thread(target);
            let size = thread.config().page_size;
            thread.load_page(page, size, true).await?;
            let id = CommentId(id);
            thread.request_delete(id.clone())?;
            if !yes && !ask_confirmation(&id)? {
                thread.cancel_delete(&id);
                println!("not deleting");
                return Ok(());
            }
            let res = thread.confirm_delete(id).await;
            print_notices(&mut thread);
            res.context("deleting comment")?;
        }
        Command::Friends => {
            let links = HttpApi::new(client.clone()).links().await?;
            let picked = friends::pick_friends(links, &mut rand::thread_rng());
            if picked.is_empty() {
                println!("no friends yet");
            }
            for link in picked {
                println!("{} <{}>", link.name, link.url);
            }
        }
    }

    Ok(())
}
