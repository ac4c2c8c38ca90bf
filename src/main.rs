mod session;

use embedding_engine::{EmbeddingCoordinator, PrecomputedProvider};
use imagerank_core::{
    CoreError, ErrorExt, ErrorReporter, ImageSource, Label, RankerConfig,
};
use ranking_engine::RankingOrchestrator;
use session::Session;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: imagerank <session.json> [config.toml] [--json]";

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("imagerank=info,ranking_engine=info,embedding_engine=info,forest_engine=info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting imagerank");

    let result = run().await;
    if let Err(e) = &result {
        ErrorReporter::new().report_error(e);
        eprintln!("{}", e.user_friendly_message());
    }
    result
}

async fn run() -> Result<(), CoreError> {
    let mut json = false;
    let mut paths = Vec::new();
    for arg in std::env::args().skip(1) {
        if arg == "--json" {
            json = true;
        } else {
            paths.push(arg);
        }
    }

    let session_path = paths.first().ok_or_else(|| CoreError::InvalidInput {
        message: USAGE.to_string(),
    })?;
    let config = load_config(paths.get(1).map(String::as_str))?;
    let session = Session::load(session_path)?;

    let provider = PrecomputedProvider::new(
        session
            .images
            .iter()
            .filter_map(|image| Some((image.id.clone(), image.embedding.clone()?)))
            .collect(),
    );

    let coordinator = EmbeddingCoordinator::from_config(&config.embedding, |_| provider.clone())?;
    let sources = session
        .images
        .iter()
        .map(|image| ImageSource::new(image.id.clone(), Vec::new()))
        .collect();
    let embeddings = coordinator.compute_all(sources).await?;

    let mut orchestrator = RankingOrchestrator::new(&config);
    if let Some(strategy) = session.strategy {
        orchestrator.set_strategy(strategy);
    }
    orchestrator.set_images(session.images.iter().map(|image| image.id.clone()).collect());
    orchestrator.insert_embeddings(embeddings);
    for image in &session.images {
        if image.label != Label::Unlabeled {
            orchestrator.toggle_label(&image.id, image.label)?;
        }
    }

    let strategy = orchestrator.strategy();
    let ranking = orchestrator.recompute().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(ranking)?);
    } else {
        println!("Ranking ({strategy}):");
        for (position, entry) in ranking.entries().iter().enumerate() {
            let score = entry
                .score
                .map_or_else(|| "-".to_string(), |score| format!("{score:.4}"));
            println!(
                "{:>4}  {:<32} {:<10} {}",
                position + 1,
                entry.image.name(),
                format!("{:?}", entry.label).to_lowercase(),
                score
            );
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<RankerConfig, CoreError> {
    let Some(path) = path else {
        return Ok(RankerConfig::default());
    };
    match RankerConfig::load(path) {
        Err(e) if e.is_recoverable() => {
            ErrorReporter::new().report_warning(&e);
            Ok(RankerConfig::default())
        }
        other => other,
    }
}
