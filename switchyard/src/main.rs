#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::sync::Arc;

use anyhow::Context;
use args::{Args, Command};
use clap::Parser;
use switchyard_config::Config;
use switchyard_core::convert::{AzureModeration, BgeRerank, CohereRerank};
use switchyard_core::standin::{RuleModeration, SyntheticRerank};
use switchyard_core::{CapabilityRouter, InvocationParams, ModerationRequest, PromptMessage, RerankRequest, Usage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        Config::default()
    };

    // Initialize logging
    switchyard_telemetry::init(&config.logging)?;

    tracing::debug!(config_path = %args.config.display(), "starting switchyard");

    let router = Arc::new(build_router(&config)?);
    run(&config, &router, args.command).await
}

/// Router with the built-in estimators and the local stand-in backends
fn build_router(config: &Config) -> anyhow::Result<CapabilityRouter> {
    let moderation = RuleModeration::new(&config.moderation.rules)?;

    let mut builder = CapabilityRouter::builder()
        .with_builtin_estimators()
        .register_rerank::<CohereRerank>(Arc::new(SyntheticRerank))
        .register_rerank::<BgeRerank>(Arc::new(SyntheticRerank))
        .register_moderation::<AzureModeration>(Arc::new(moderation))
        .pricing(config.pricing_table()?);

    for (provider, params) in config.provider_defaults()? {
        builder = builder.defaults(provider, params);
    }

    Ok(builder.build())
}

async fn run(config: &Config, router: &Arc<CapabilityRouter>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Routes => {
            for (capability, provider) in router.routes() {
                println!("{capability}\t{provider}");
            }
        }

        Command::CountTokens { provider, texts } => {
            let messages: Vec<PromptMessage> = texts.into_iter().map(PromptMessage::user).collect();
            println!("{}", router.count_tokens(provider, &messages, &[]));
        }

        Command::EmbeddingTokens { provider, texts } => {
            for (text, tokens) in texts.iter().zip(router.count_embedding_tokens(provider, &texts)) {
                println!("{tokens}\t{text}");
            }
        }

        Command::Voices { provider, language } => {
            for voice in router.list_voices(provider, language.as_deref()).await {
                println!("{}\t{}\t{}", voice.id, voice.name, voice.language.as_deref().unwrap_or("*"));
            }
        }

        Command::Rerank {
            provider,
            query,
            top_n,
            documents,
        } => {
            let request = RerankRequest {
                query,
                documents,
                top_n,
                ..RerankRequest::default()
            };
            let result = router
                .rerank(provider, &request, &InvocationParams::default())
                .await?;

            for item in result.items {
                println!("{:.3}\t{}\t{}", item.relevance_score, item.index, item.document);
            }
        }

        Command::Moderate { provider, text } => {
            let request = ModerationRequest { text, user: None };
            let flagged = router
                .moderate(provider, &request, &InvocationParams::default())
                .await;
            println!("{}", if flagged { "flagged" } else { "clean" });
        }

        Command::Summarize {
            provider,
            instruction,
            file,
        } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?,
            };

            let summary = config
                .summarizer(Arc::clone(router), provider)
                .summarize(&text, &instruction)
                .await?;
            println!("{summary}");
        }

        Command::Cost {
            provider,
            model,
            prompt_tokens,
            completion_tokens,
        } => {
            let usage = Usage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens.saturating_add(completion_tokens),
            };
            let cost = router.estimate_cost(provider, &model, &usage);
            println!(
                "input {:.6}\toutput {:.6}\ttotal {:.6}",
                cost.input_cost, cost.output_cost, cost.total_cost
            );
        }
    }

    Ok(())
}
