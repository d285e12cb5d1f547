use super::render::{print_messages, render_notebook, render_notebook_list};
use super::setup::{Cli, Commands};
use clap::Parser;
use console::Term;
use kodonote::api::{CmdMessage, KodoApi};
use kodonote::config::KodoConfig;
use kodonote::display::Layout;
use kodonote::error::{KodoError, Result};
use kodonote::init::{initialize, KodoContext};
use kodonote::logging::init_logging;
use kodonote::model::{FocusIdentity, SectionType};
use kodonote::remote::fs::FileRemote;
use kodonote::session::{Navigator, NotebookSession};

struct AppContext {
    api: KodoApi<FileRemote>,
    config: KodoConfig,
    owner: Option<String>,
    use_color: bool,
}

impl AppContext {
    fn owner(&self) -> Result<&str> {
        self.owner
            .as_deref()
            .ok_or_else(|| KodoError::Api("No owner set: pass --owner or set KODO_OWNER".into()))
    }

    fn print_notebook(&self, session: &NotebookSession<FileRemote>) {
        print!(
            "{}",
            render_notebook(
                session.notebook(),
                session.layout(),
                self.config.grid_columns(),
                self.use_color,
            )
        );
    }
}

/// The terminal has a single view, so going back to "main" only ends the
/// session.
struct CliNavigator;

impl Navigator for CliNavigator {
    fn go_to_main(&self) {
        tracing::debug!("back to main view");
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    // A subscriber may already be installed (tests); that one is kept.
    let _ = init_logging(cli.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(cli))
}

async fn dispatch(cli: Cli) -> Result<()> {
    let ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Create { title, color }) => handle_create(&ctx, title, color).await,
        Some(Commands::List) | None => handle_list(&ctx).await,
        Some(Commands::Show {
            title,
            layout,
            follow,
        }) => handle_show(&ctx, &title, layout, follow).await,
        Some(Commands::Add {
            title,
            section_type,
            value,
        }) => handle_add(&ctx, &title, section_type, value).await,
        Some(Commands::Edit { title, index, value }) => {
            handle_edit(&ctx, &title, index, value).await
        }
        Some(Commands::Remove { title }) => handle_remove(&ctx, &title).await,
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let KodoContext { api, config, .. } = initialize(cli.home.as_deref())?;
    let owner = cli.owner.clone().or_else(|| config.owner.clone());
    let use_color = !cli.no_color && Term::stdout().features().colors_supported();

    Ok(AppContext {
        api,
        config,
        owner,
        use_color,
    })
}

/// Opens a session on `title` and waits for its remote copy.
async fn open_ready(ctx: &AppContext, title: &str) -> Result<NotebookSession<FileRemote>> {
    let identity = FocusIdentity::new(ctx.owner()?, title);
    if !ctx.api.notebook_exists(&identity).await? {
        return Err(KodoError::NotebookNotFound(title.to_string()));
    }

    let mut session = ctx.api.open_session(identity);
    match tokio::time::timeout(ctx.config.hydrate_timeout(), session.wait_until_ready()).await {
        Ok(ready) => ready?,
        Err(_) => return Err(KodoError::NotebookNotFound(title.to_string())),
    }
    Ok(session)
}

async fn save_and_leave(ctx: &AppContext, mut session: NotebookSession<FileRemote>) -> Result<()> {
    session.save().await?;
    ctx.print_notebook(&session);
    if session.is_saved() {
        print_messages(&[CmdMessage::success("Notebook saved!")], ctx.use_color);
        session.dismiss_saved();
    }
    session.leave(&CliNavigator);
    Ok(())
}

async fn handle_create(ctx: &AppContext, title: String, color: String) -> Result<()> {
    let identity = FocusIdentity::new(ctx.owner()?, title).with_color(color);
    let result = ctx.api.create_notebook(&identity).await?;
    print_messages(&result.messages, ctx.use_color);
    Ok(())
}

async fn handle_list(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.list_notebooks(ctx.owner()?).await?;
    print!("{}", render_notebook_list(&result.listed_notebooks, ctx.use_color));
    print_messages(&result.messages, ctx.use_color);
    Ok(())
}

async fn handle_show(ctx: &AppContext, title: &str, layout: Option<Layout>, follow: bool) -> Result<()> {
    let mut session = open_ready(ctx, title).await?;
    if let Some(layout) = layout {
        session.set_layout(layout);
    }
    ctx.print_notebook(&session);

    if follow {
        let watcher = ctx.api.remote().spawn_watcher(ctx.config.poll_interval()).await;
        let outcome = loop {
            tokio::select! {
                next = session.next_remote() => {
                    if let Err(e) = next {
                        break Err(e);
                    }
                    session.apply_pending();
                    println!();
                    ctx.print_notebook(&session);
                }
                _ = tokio::signal::ctrl_c() => break Ok(()),
            }
        };
        watcher.abort();
        outcome?;
    }

    session.leave(&CliNavigator);
    Ok(())
}

async fn handle_add(
    ctx: &AppContext,
    title: &str,
    section_type: SectionType,
    value: Option<String>,
) -> Result<()> {
    let mut session = open_ready(ctx, title).await?;
    session.add_section(section_type);
    if let Some(value) = value {
        let last = session.blocks().len() - 1;
        session.edit_block(last, value)?;
    }
    save_and_leave(ctx, session).await
}

async fn handle_edit(ctx: &AppContext, title: &str, index: usize, value: String) -> Result<()> {
    let mut session = open_ready(ctx, title).await?;
    let len = session.blocks().len();
    let position = index
        .checked_sub(1)
        .filter(|i| *i < len)
        .ok_or_else(|| KodoError::Api(format!("No block {} (notebook has {} blocks)", index, len)))?;
    session.edit_block(position, value)?;
    save_and_leave(ctx, session).await
}

async fn handle_remove(ctx: &AppContext, title: &str) -> Result<()> {
    let mut session = open_ready(ctx, title).await?;
    if session.remove_section().is_none() {
        print_messages(
            &[CmdMessage::warning("Notebook has no blocks to remove.")],
            ctx.use_color,
        );
        session.leave(&CliNavigator);
        return Ok(());
    }
    save_and_leave(ctx, session).await
}
