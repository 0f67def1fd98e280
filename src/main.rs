use site_behaviors::{
    NodeSpec, Page, Site, SiteConfig, SiteDeps, demo_page, load_config, render_html,
    resolve_config_path, resolve_page_path, walkthrough,
};
use tokio::{fs, sync::oneshot};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = match resolve_config_path() {
        Some(path) => load_config(&path).await,
        None => SiteConfig::default(),
    };

    let spec = match resolve_page_path() {
        Some(path) => {
            info!("loading page from {}", path.display());
            NodeSpec::from_json(&fs::read(&path).await?)?
        }
        None => demo_page()?,
    };

    let page = Page::new(spec.into_dom());
    let deps = SiteDeps::with_config(config)?;
    let (tx, rx) = oneshot::channel();
    page.on_ready(move |page| {
        let _ = tx.send(Site::attach_discovered(page, deps));
    });
    page.finish_loading();
    let site = rx.await?;

    walkthrough::run(&site).await;
    print!("{}", render_html(&page.snapshot()));
    Ok(())
}
