use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    HttpPreferenceApi, PreferenceWorkflow, PrimaryOutcome, RecordingNotifier, RequestContext,
    ToastKind,
};
use shared::{
    domain::{CourseCategory, CourseId, TeacherInitial},
    protocol::PayloadShape,
};
use tracing::warn;

mod config;

use config::{load_settings, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(about = "Rank and submit a teacher's course preferences")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    token: Option<String>,
    #[arg(long)]
    payload_shape: Option<PayloadShape>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct FormArgs {
    #[arg(long)]
    initial: String,
    #[arg(long, default_value = "theory")]
    category: CourseCategory,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the courses on a teacher's form.
    Show {
        #[command(flatten)]
        form: FormArgs,
    },
    /// Rank the given courses first and print the review.
    Review {
        #[command(flatten)]
        form: FormArgs,
        #[arg(long, value_delimiter = ',')]
        order: Vec<String>,
    },
    /// Rank, review and submit.
    Submit {
        #[command(flatten)]
        form: FormArgs,
        #[arg(long, value_delimiter = ',')]
        order: Vec<String>,
        #[arg(long)]
        yes: bool,
    },
}

type Workflow = PreferenceWorkflow<HttpPreferenceApi, RecordingNotifier>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config);
    if let Some(url) = cli.api_url {
        settings.api_base_url = url;
    }
    if let Some(token) = cli.token {
        settings.auth_token = Some(token);
    }
    if let Some(shape) = cli.payload_shape {
        settings.payload_shape = shape;
    }

    let mut context = RequestContext::new(&settings.api_base_url)
        .with_context(|| format!("invalid api url {}", settings.api_base_url))?;
    if let Some(token) = &settings.auth_token {
        context = context.with_auth_token(token.clone());
    }
    let api = Arc::new(
        HttpPreferenceApi::with_timeout(context, settings.request_timeout())
            .context("failed to build http client")?
            .with_payload_shape(settings.payload_shape),
    );
    let notifier = Arc::new(RecordingNotifier::new());

    match cli.command {
        Command::Show { form } => {
            let workflow = open(&api, &notifier, &form).await?;
            let session = workflow.session();
            println!(
                "{} ({}) - {} {} courses",
                session.teacher_name,
                session.initial,
                session.lists.available().len(),
                session.category
            );
            for course in session.lists.available() {
                println!("  {} - {}", course.course_id, course.name);
            }
        }
        Command::Review { form, order } => {
            let mut workflow = open(&api, &notifier, &form).await?;
            rank(&mut workflow, &order)?;
            println!("{}", workflow.review()?);
        }
        Command::Submit { form, order, yes } => {
            let mut workflow = open(&api, &notifier, &form).await?;
            rank(&mut workflow, &order)?;
            println!("{}", workflow.review()?);
            if !yes {
                println!("Not submitted; re-run with --yes to confirm.");
                return Ok(());
            }
            let result = workflow.confirm().await;
            print_toasts(&notifier);
            result?;
        }
    }

    Ok(())
}

async fn open(
    api: &Arc<HttpPreferenceApi>,
    notifier: &Arc<RecordingNotifier>,
    form: &FormArgs,
) -> Result<Workflow> {
    let result = PreferenceWorkflow::load(
        api,
        notifier,
        TeacherInitial::new(form.initial.trim()),
        form.category,
    )
    .await;
    print_toasts(&notifier);
    Ok(result?)
}

fn rank(workflow: &mut Workflow, order: &[String]) -> Result<()> {
    for raw in order {
        let id = CourseId::new(raw.trim());
        if !workflow.move_to_preference(std::slice::from_ref(&id), None)? {
            warn!(course_id = %id, "course not on the form or already ranked");
        }
    }

    loop {
        match workflow.primary_action()? {
            PrimaryOutcome::CollectedRemaining(count) => {
                if count > 0 {
                    println!("Appended {count} unranked course(s) in form order.");
                }
            }
            PrimaryOutcome::Reviewing => return Ok(()),
        }
    }
}

fn print_toasts(notifier: &RecordingNotifier) {
    for toast in notifier.drain() {
        match toast.kind {
            ToastKind::Success => println!("[ok] {}", toast.message),
            ToastKind::Failure => eprintln!("[error] {}", toast.message),
        }
    }
}
