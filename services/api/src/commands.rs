use crate::infra::{parse_date, payload_batch, read_payload, Integrations, Provisioner};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use hire_bridge::config::AppConfig;
use hire_bridge::error::AppError;
use hire_bridge::integrations::bamboohr::{EmployeeDirectory, HrisDirectory};
use hire_bridge::telemetry;
use hire_bridge::workflows::compensation::NoticeDelivery;
use hire_bridge::workflows::hiring::{ProvisioningError, ProvisioningReport};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct ProvisionArgs {
    /// JSON file holding one webhook payload or an array of payloads
    pub(crate) payload: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct CompensationArgs {
    /// JSON file holding a BambooHR compensation webhook
    pub(crate) payload: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct RequisitionArgs {
    /// Notion page URL or id
    pub(crate) page: String,
    /// TeamTailor user to assign as the requisition owner
    #[arg(long)]
    pub(crate) user_id: Option<String>,
    /// Print the requisition body without sending it
    #[arg(long)]
    pub(crate) dry_run: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BambooHrArgs {
    #[command(subcommand)]
    pub(crate) query: BambooHrQuery,
}

/// Read-only lookups; none of them change the BambooHR account.
#[derive(Subcommand, Debug)]
pub(crate) enum BambooHrQuery {
    /// Verify the API key by fetching the company information
    Check,
    /// List the employee directory
    Employees,
    /// List the webhooks registered for the account
    Webhooks,
    /// Print time tracking projects as JSON
    Projects,
    /// Print timesheet entries for a date range as JSON
    Timesheets(TimesheetArgs),
    /// Print the datasets available for reporting as JSON
    Datasets,
}

#[derive(Args, Debug)]
pub(crate) struct TimesheetArgs {
    /// First day of the range (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) start: NaiveDate,
    /// Last day of the range (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) end: NaiveDate,
    /// Comma-separated employee ids; all employees when omitted
    #[arg(long, value_delimiter = ',')]
    pub(crate) employee_ids: Vec<u64>,
}

fn bootstrap(config_path: Option<&Path>) -> Result<(AppConfig, Integrations), AppError> {
    let config = AppConfig::load(config_path)?;
    telemetry::init(&config.telemetry)?;
    let integrations = Integrations::connect(&config)?;
    Ok((config, integrations))
}

pub(crate) async fn run_provision(
    config_path: Option<&Path>,
    args: ProvisionArgs,
) -> Result<(), AppError> {
    let (config, integrations) = bootstrap(config_path)?;
    let service = integrations.provisioner(&config);
    let payloads = payload_batch(read_payload(&args.payload).await?);
    let total = payloads.len();

    println!(
        "Processing {} payload(s) from {} (test mode: {})",
        total,
        args.payload.display(),
        if config.hiring.test_mode { "on" } else { "off" }
    );

    provision_batch(&service, payloads).await
}

/// Provision each payload in turn, reporting failures after the whole batch ran.
async fn provision_batch(service: &Provisioner, payloads: Vec<Value>) -> Result<(), AppError> {
    let total = payloads.len();
    let mut failures = 0usize;
    for (index, payload) in payloads.into_iter().enumerate() {
        print!("[{}/{}] ", index + 1, total);
        match service.handle_payload(payload).await {
            Ok(report) => print_report(&report),
            Err(ProvisioningError::Ignored {
                event_name,
                stage_name,
            }) => println!(
                "skipped: event {} at stage {}",
                event_name.as_deref().unwrap_or("-"),
                stage_name.as_deref().unwrap_or("-")
            ),
            Err(err) => {
                failures += 1;
                println!("failed: {}", err);
            }
        }
    }

    println!("Done: {} processed, {} failed", total, failures);
    batch_outcome(failures, total, "payload(s)")
}

/// A batch with any failed item makes the command exit non-zero.
fn batch_outcome(failed: usize, total: usize, what: &'static str) -> Result<(), AppError> {
    if failed == 0 {
        Ok(())
    } else {
        Err(AppError::Incomplete {
            failed,
            total,
            what,
        })
    }
}

fn print_report(report: &ProvisioningReport) {
    let employee = &report.employee;
    println!(
        "created {} <{}> as {}",
        employee.name, employee.email, employee.job_title
    );
    if let Some(url) = &report.bamboo_hr_url {
        println!("  profile: {}", url);
    }
    if let Some(department) = &employee.department {
        println!("  department: {}", department);
    }
    for option in &report.meta_fields_created {
        println!(
            "  new {} option: {}",
            option.field_name.alias(),
            option.value
        );
    }
    for file in &report.files_uploaded {
        println!(
            "  uploaded {} ({})",
            file.filename,
            file.file_id.as_deref().unwrap_or("no id")
        );
    }
    for warning in &report.warnings {
        println!("  warning [{:?}]: {}", warning.step, warning.detail);
    }
}

pub(crate) async fn run_compensation(
    config_path: Option<&Path>,
    args: CompensationArgs,
) -> Result<(), AppError> {
    let (config, integrations) = bootstrap(config_path)?;
    if !integrations.has_chat() {
        println!("SLACK_WEBHOOK_URL is not set; notices are printed only");
    }
    let notifier = integrations.notifier(&config);
    let deliveries = notifier
        .handle_payload(read_payload(&args.payload).await?)
        .await?;

    for delivery in &deliveries {
        print_delivery(delivery);
    }
    let failed = deliveries.iter().filter(|delivery| delivery.failed()).count();
    batch_outcome(failed, deliveries.len(), "notice(s)")
}

fn print_delivery(delivery: &NoticeDelivery) {
    println!("{}", delivery.notice.text);
    println!(
        "  {} (posted: {})",
        delivery.notice.metadata.employee_name,
        if delivery.posted { "yes" } else { "no" }
    );
    if let Some(err) = &delivery.delivery_error {
        println!("  delivery failed: {}", err);
    }
}

pub(crate) async fn run_requisition(
    config_path: Option<&Path>,
    args: RequisitionArgs,
) -> Result<(), AppError> {
    let (config, integrations) = bootstrap(config_path)?;
    let sync = integrations.requisitions(&config)?;

    if args.dry_run {
        let prepared = sync.prepare(&args.page, args.user_id.as_deref()).await?;
        println!("{}", serde_json::to_string_pretty(&prepared.payload)?);
        return Ok(());
    }

    let outcome = sync.sync(&args.page, args.user_id.as_deref()).await?;
    println!(
        "{} requisition {}",
        if outcome.created { "Created" } else { "Updated" },
        outcome.requisition_id
    );
    Ok(())
}

pub(crate) async fn run_bamboohr(
    config_path: Option<&Path>,
    args: BambooHrArgs,
) -> Result<(), AppError> {
    let (_, integrations) = bootstrap(config_path)?;
    query_bamboohr(integrations.hris().as_ref(), args.query).await
}

async fn query_bamboohr<D: HrisDirectory>(
    directory: &D,
    query: BambooHrQuery,
) -> Result<(), AppError> {
    match query {
        BambooHrQuery::Check => match directory.company_information().await {
            Ok(company) => {
                println!(
                    "Connection successful: {}",
                    company
                        .display_name
                        .or(company.legal_name)
                        .as_deref()
                        .unwrap_or("unnamed company")
                );
            }
            Err(err) => {
                match err.status() {
                    Some(status) => println!("Connection failed with status {}", status),
                    None => println!("Connection failed before BambooHR answered"),
                }
                return Err(err.into());
            }
        },
        BambooHrQuery::Employees => print_directory(&directory.employee_directory().await?),
        BambooHrQuery::Webhooks => {
            let webhooks = directory.webhooks().await?;
            println!("{} webhook(s)", webhooks.len());
            for webhook in &webhooks {
                println!(
                    "  {} {} -> {}",
                    webhook.id.as_deref().unwrap_or("-"),
                    webhook.name.as_deref().unwrap_or("unnamed"),
                    webhook.url.as_deref().unwrap_or("-")
                );
            }
        }
        BambooHrQuery::Projects => print_json(&directory.time_tracking_projects().await?)?,
        BambooHrQuery::Timesheets(args) => {
            let entries = directory
                .timesheet_entries(args.start, args.end, &args.employee_ids)
                .await?;
            print_json(&entries)?;
        }
        BambooHrQuery::Datasets => print_json(&directory.datasets().await?)?,
    }
    Ok(())
}

fn print_directory(directory: &EmployeeDirectory) {
    println!("{} employee(s)", directory.employees.len());
    for employee in &directory.employees {
        println!(
            "  {:>6}  {}  {}",
            employee.id.as_deref().unwrap_or("-"),
            employee.display_name.as_deref().unwrap_or("unnamed"),
            employee.job_title.as_deref().unwrap_or("")
        );
    }
}

fn print_json(value: &Value) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
