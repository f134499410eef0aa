use llm_oneshot::{env, llm::Llm, Client};

const PROMPT: &str = "explain large language models in one sentence";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(feature = "tracing")]
    init_tracing();

    let _dotenv = env::load()?;
    #[cfg(feature = "tracing")]
    if let Some(path) = &_dotenv {
        tracing::info!(path = %path.display(), "Loaded configuration file");
    }

    let llm = Llm::new(Llm::DEFAULT_MODEL, Client::new(None, None)?);
    let completion = llm.complete(PROMPT).await?;

    println!("{completion}");
    return Ok(());
}

#[cfg(feature = "tracing")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
