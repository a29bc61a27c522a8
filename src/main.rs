mod cli;
mod config;
mod directory;
mod engine;
mod error;
mod export;
mod queue;
mod receipts;
mod refdata;
mod state_machine;
mod store;
mod ui;
mod validate;

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use rust_decimal::Decimal;

use cli::{Cli, Command};
use config::DespesaConfig;
use directory::{Role, StaticDirectory};
use engine::{Decision, DraftHeader, WorkflowEngine};
use error::DespesaError;
use queue::AssignedSupervisor;
use refdata::{Health, ReferenceData, StaticRefData, WorkbookProvider};
use state_machine::LineDraft;
use store::MemoryStore;
use ui::WorkflowProgress;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = DespesaConfig::load()?;

    match cli.command {
        Command::Workbook { dir } => {
            inspect_workbook(dir.as_deref().unwrap_or(&config.workbook_dir), &config)?;
        }
        Command::Demo => run_demo(&config).await?,
    }
    Ok(())
}

/// Load and report on the reference workbook, failing with the operator
/// guidance message when it cannot be consumed.
fn inspect_workbook(dir: &str, config: &DespesaConfig) -> Result<(), DespesaError> {
    let provider = WorkbookProvider::new(dir, config.refdata_max_age());
    let snapshot = provider.snapshot()?;

    println!("Reference workbook at '{dir}' is healthy.");
    println!("  GL accounts: {}", snapshot.gl_accounts.len());
    for account in snapshot.gl_accounts.iter().take(5) {
        println!("    {}", account.label);
    }
    if snapshot.gl_accounts.len() > 5 {
        println!("    ...");
    }
    println!("  Categories: {}", snapshot.categories.len());
    for category in snapshot.categories.iter().take(5) {
        println!("    {category}");
    }
    if snapshot.categories.len() > 5 {
        println!("    ...");
    }
    Ok(())
}

/// Walk one report through the whole lifecycle against an in-memory
/// store: draft, lines, submission, supervisor approval, and export.
async fn run_demo(config: &DespesaConfig) -> Result<(), DespesaError> {
    let mut directory = StaticDirectory::new();
    let employee = directory.add("ana@example.com", Role::Employee);
    let supervisor = directory.add("bruno@example.com", Role::Supervisor);
    let admin = directory.add("carla@example.com", Role::Admin);

    // Prefer the deployed workbook; fall back to embedded sets so the
    // demo runs on a bare checkout.
    let workbook = WorkbookProvider::new(&config.workbook_dir, config.refdata_max_age());
    let refdata: Arc<dyn ReferenceData> = match workbook.health() {
        Health::Healthy => Arc::new(workbook),
        Health::Unavailable(reason) => {
            tracing::debug!(%reason, "workbook unavailable, using embedded demo sets");
            Arc::new(StaticRefData::new(
                &[("6000", "Travel"), ("6100", "Meals")],
                &["Travel", "Meals"],
            ))
        }
    };
    let snapshot = refdata.snapshot()?;
    let gl_account = snapshot
        .gl_accounts
        .first()
        .map(|a| a.account.clone())
        .unwrap_or_else(|| "6000".to_string());
    let category = snapshot
        .categories
        .first()
        .cloned()
        .unwrap_or_else(|| "Travel".to_string());

    let engine = WorkflowEngine::new(
        Arc::new(MemoryStore::new()),
        refdata,
        Arc::new(directory),
        Arc::new(AssignedSupervisor),
    );

    let progress = WorkflowProgress::start("monthly expense report");
    let report_id = engine.create_draft(employee)?;
    engine.update_draft_header(
        report_id,
        employee,
        DraftHeader {
            supervisor: Some(supervisor),
            report_month: Utc::now().date_naive(),
            notes: "Client onsite".to_string(),
        },
    )?;

    let mut line = LineDraft {
        date: Utc::now().date_naive(),
        gl_account,
        category,
        vendor: "Acme Travel".to_string(),
        description: "flight to client".to_string(),
        amount: Decimal::new(42000, 2),
        receipt_url: None,
    };

    if let Some(client) = receipts::ReceiptClient::from_config(config) {
        progress.step("uploading receipt");
        let url = client
            .upload(
                report_id,
                0,
                "flight.pdf",
                "application/pdf",
                b"%PDF-1.4 demo".to_vec(),
            )
            .await?;
        line.receipt_url = Some(url);
    }

    engine.update_draft_lines(report_id, employee, vec![line])?;
    progress.step("submitting for review");
    engine.submit(report_id, employee)?;

    let pending = engine.pending_for_supervisor(supervisor)?;
    progress.step(&format!(
        "supervisor reviewing ({} pending)",
        pending.len()
    ));
    engine.decide(
        report_id,
        supervisor,
        Decision::Approve,
        Some("Looks good".to_string()),
    )?;

    progress.complete(state_machine::ReportStatus::Approved);
    progress.print_audit(&engine.audit_trail(report_id));

    println!();
    println!("Accounting upload CSV:");
    print!("{}", engine.export_approved_csv(admin)?);
    Ok(())
}
