//! Subcommand implementations.

use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use estimator_core::{ClientConfig, OrderId, SubmissionState};
use estimator_sdk::prelude::*;
use estimator_sdk::EstimateView;
use tracing::debug;

use crate::attachment;

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Free-text order description
    #[arg(long, default_value = "")]
    pub text: String,

    /// PDF or image with the order
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Customer email
    #[arg(long)]
    pub email: Option<String>,
}

fn build_client(config: ClientConfig) -> Result<Arc<EstimatorClient>> {
    let client = EstimatorClient::new(config).context("failed to create estimator client")?;
    Ok(Arc::new(client))
}

pub async fn submit(config: ClientConfig, args: SubmitArgs) -> Result<ExitCode> {
    let mut collector = InputCollector::new();
    collector.set_text(args.text);
    if let Some(email) = args.email {
        collector.set_email(email);
    }
    if let Some(path) = &args.file {
        collector.attach_file(attachment::load(path).await?);
    }

    let orchestrator = SubmissionOrchestrator::with_client(build_client(config)?);
    if !collector.submit_enabled(orchestrator.is_busy()) {
        if let Some(hint) = collector.hint() {
            eprintln!("{}", hint);
        }
        return Ok(ExitCode::from(2));
    }
    if let Some(name) = collector.selected_file_name() {
        eprintln!("Selected: {}", name);
    }

    let mut transitions = orchestrator.subscribe();
    let outcome = follow_submission(
        orchestrator.submit(collector.draft()),
        &mut transitions,
        report_transition,
    )
    .await;

    match orchestrator.state() {
        SubmissionState::Succeeded(result) => {
            let mut view = EstimateView::from_result(&result);
            if let Some(receipt) = orchestrator.last_intake().await {
                println!("Order {}", receipt.order_id);
                view = view.with_intake_issues(&receipt.issues);
            }
            print!("{}", view);
            Ok(ExitCode::SUCCESS)
        }
        SubmissionState::Failed(message) => {
            eprintln!("Error: {}", message);
            Ok(ExitCode::FAILURE)
        }
        other => {
            // Only reachable if the guard rejected the draft
            let err = outcome.err().map(|e| e.user_message()).unwrap_or_default();
            eprintln!("Error: {} ({})", err, other.label());
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Drive `submission` to completion, handing every state transition to
/// `on_event` in order, including the ones published right before it returns.
async fn follow_submission<F, R>(
    submission: F,
    transitions: &mut StateSubscription<SubmissionState>,
    mut on_event: impl FnMut(&StateChangeEvent<SubmissionState>),
) -> R
where
    F: Future<Output = R>,
{
    tokio::pin!(submission);
    let outcome = loop {
        tokio::select! {
            outcome = &mut submission => break outcome,
            Some(event) = transitions.next() => on_event(&event),
        }
    };
    while let Some(event) = transitions.try_next() {
        on_event(&event);
    }
    outcome
}

fn report_transition(event: &StateChangeEvent<SubmissionState>) {
    if event.current.is_busy() {
        eprintln!("Processing...");
    }
    debug!(state = event.current.label(), "Submission state changed");
}

pub async fn dashboard(config: ClientConfig) -> Result<ExitCode> {
    let aggregator = DashboardAggregator::with_client(build_client(config)?);
    let view = aggregator.load_dashboard().await;
    print!("{}", view);

    Ok(if view.error.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

pub async fn order(config: ClientConfig, id: &str) -> Result<ExitCode> {
    let id = match id.parse::<i64>() {
        Ok(n) => OrderId::Number(n),
        Err(_) => OrderId::from(id),
    };

    match build_client(config)?.fetch_order(&id).await {
        Ok(order) => {
            let badge = estimator_sdk::StatusBadge::for_status(order.status.as_deref());
            println!("Order {} {}", order.order_id, badge);
            if let Some(product) = &order.product_type {
                println!("  Product:  {}", product);
            }
            if let Some(quantity) = order.quantity {
                println!("  Quantity: {}", quantity);
            }
            if let Some(price) = order.final_price {
                println!("  Price:    {}", estimator_sdk::presenter::format_money(price));
            }
            if let Some(issues) = order.issues.as_deref().filter(|i| !i.is_empty()) {
                println!("  Issues:   {}", issues);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("Error: {}", err.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

pub async fn health(config: ClientConfig) -> Result<ExitCode> {
    let client = build_client(config)?;
    match client.health().await {
        Ok(status) if status.is_ok() => {
            println!(
                "{} is up ({})",
                client.config().base_url,
                status.service.as_deref().unwrap_or("unknown service")
            );
            Ok(ExitCode::SUCCESS)
        }
        Ok(status) => {
            eprintln!("{} reports status {:?}", client.config().base_url, status.status);
            Ok(ExitCode::FAILURE)
        }
        Err(err) => {
            eprintln!("Error: {}", err.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}
