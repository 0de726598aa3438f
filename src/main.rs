use anyhow::Context;
use email_subscribe::{
    configuration::{get_configuration, StoreSettings},
    prompt::ask_for_confirmation,
    startup::Application,
    store::Store,
    telemetry::{get_subscriber, init_subscriber},
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("email_subscribe".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let config = get_configuration().context("Failed to read configuration")?;

    if config.store.wipe_on_startup {
        wipe_store(&config.store)?;
    }

    let application = Application::build(config).await?;
    application.run_until_stopped().await
}

fn wipe_store(settings: &StoreSettings) -> Result<(), anyhow::Error> {
    let question = format!(
        "Do you really want to delete every subscription in `{}`?",
        settings.path.display()
    );
    let confirmed = ask_for_confirmation(
        &question,
        &mut std::io::stdin().lock(),
        &mut std::io::stderr(),
    )
    .context("Failed to read confirmation")?;

    if !confirmed {
        tracing::info!("Keeping stored subscriptions");
        return Ok(());
    }

    let store = Store::open(&settings.path)?;
    store.wipe()?;
    store.close();

    tracing::warn!("Subscription store has been wiped and recreated");
    Ok(())
}
