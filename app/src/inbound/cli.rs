//! `findmyjob` command-line front end.
//!
//! Each subcommand builds the adapters it needs from [`ClientSettings`],
//! calls one service operation, and writes a plain-text summary.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use job_filter::JobFilters;
use mockable::DefaultClock;
use tracing::debug;

use crate::config::ClientSettings;
use crate::domain::ports::{ImageUpload, JobRepository, KeyValueStore, MediaUploader};
use crate::domain::{
    Analytics, ApiClient, ApiClientPorts, ApplicationsService, AuthService,
    CompanyAccountsService, CompanyJobsService, CompanyLogin, JobId, JobSearch, Password,
    RecommendationsService, SavedJobsService, SearchHistory, SessionStore, TtlCache, UserProfile,
    parse_deep_link,
};
use crate::outbound::analytics::TracingAnalyticsSink;
use crate::outbound::http::ReqwestTransport;
use crate::outbound::media::CloudinaryUploader;
use crate::outbound::rest::{
    RestApplicationRepository, RestCompanyRepository, RestFavoritesRepository,
    RestIdentityProvider, RestJobRepository,
};
use crate::outbound::storage::FileKeyValueStore;

/// `findmyjob` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "findmyjob",
    about = "Browse jobs, track applications and manage a FindMyJob session",
    version
)]
pub struct CliArgs {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level operations.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Browse job listings.
    #[command(subcommand)]
    Jobs(JobsCommand),
    /// List tracked applications with their status counts.
    Applications,
    /// Manage recent search terms.
    #[command(subcommand)]
    History(HistoryCommand),
    /// Suggest jobs for a set of skills.
    Recommend {
        /// Skill to match; repeat for several.
        #[arg(long = "skill", value_name = "skill")]
        skills: Vec<String>,
    },
    /// Sign in and store the session locally.
    Login {
        /// Account email.
        #[arg(long, value_name = "email")]
        email: String,
        /// Account password.
        #[arg(long, value_name = "password")]
        password: String,
        /// Sign in to a company account.
        #[arg(long)]
        company: bool,
    },
    /// Forget the stored session and cached listings.
    Logout,
    /// Drop every cached API response.
    ClearCache,
    /// Resolve a deep link to the screen it opens.
    Link {
        /// `findmyjob://` or `https://findmyjob.com` URL.
        url: String,
    },
    /// Upload an image and print its hosted URL.
    UploadImage {
        /// Image file to upload.
        path: PathBuf,
        /// Destination folder.
        #[arg(long, value_name = "folder")]
        folder: Option<String>,
    },
}

/// Job listing operations.
#[derive(Debug, Clone, Subcommand)]
pub enum JobsCommand {
    /// Filter the most recent listings.
    Search {
        /// Criteria applied to the listings.
        #[command(flatten)]
        filters: FilterArgs,
        /// Number of listings to fetch before filtering.
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// List the signed-in company's postings.
    Posted {
        /// Bypass the local cache.
        #[arg(long)]
        refresh: bool,
    },
    /// List saved jobs.
    Saved,
    /// Save a job for later.
    Save {
        /// Job to save.
        job_id: String,
    },
    /// Remove a job from the saved list.
    Unsave {
        /// Job to remove.
        job_id: String,
    },
}

/// Search history operations.
#[derive(Debug, Clone, Subcommand)]
pub enum HistoryCommand {
    /// Print recent terms, newest first.
    List,
    /// Record a term.
    Add {
        /// Search term.
        term: String,
    },
    /// Forget one term.
    Remove {
        /// Search term.
        term: String,
    },
    /// Forget every term.
    Clear,
}

/// Filter criteria accepted on the command line.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Exact category.
    #[arg(long)]
    pub category: Option<String>,
    /// Exact skill.
    #[arg(long)]
    pub skill: Option<String>,
    /// Lower salary bound.
    #[arg(long, value_name = "amount")]
    pub min_salary: Option<f64>,
    /// Upper salary bound.
    #[arg(long, value_name = "amount")]
    pub max_salary: Option<f64>,
    /// Keywords; any one must appear.
    #[arg(long)]
    pub keywords: Option<String>,
}

impl From<FilterArgs> for JobFilters {
    fn from(args: FilterArgs) -> Self {
        Self {
            category: args.category,
            skill: args.skill,
            min_salary: args.min_salary,
            max_salary: args.max_salary,
            keywords: args.keywords,
        }
    }
}

/// Adapters shared by every subcommand.
struct Wiring {
    settings: ClientSettings,
    store: Arc<dyn KeyValueStore>,
    api: Arc<ApiClient>,
    analytics: Analytics,
}

impl Wiring {
    fn connect(settings: &ClientSettings) -> Result<Self> {
        let storage_path = settings.storage_path();
        let store: Arc<dyn KeyValueStore> = Arc::new(
            FileKeyValueStore::open(&storage_path)
                .wrap_err_with(|| format!("open local store at {}", storage_path.display()))?,
        );
        let transport = ReqwestTransport::new(settings.api_url()?, settings.request_timeout())
            .wrap_err("build HTTP transport")?;
        let api = ApiClient::new(
            ApiClientPorts::new(Arc::new(transport), store.clone()),
            settings.api_client_config(),
        );
        let analytics = Analytics::start(
            Arc::new(TracingAnalyticsSink),
            Arc::new(DefaultClock),
            settings.analytics_enabled,
        );
        if let Some(user_id) = SessionStore::new(store.clone()).user_id()? {
            analytics.resume_user(user_id);
        }
        Ok(Self {
            settings: settings.clone(),
            store,
            api: Arc::new(api),
            analytics,
        })
    }

    fn jobs(&self) -> Arc<RestJobRepository> {
        Arc::new(RestJobRepository::new(self.api.clone()))
    }

    fn saved_jobs(&self) -> SavedJobsService<RestFavoritesRepository, RestJobRepository> {
        SavedJobsService::new(
            Arc::new(RestFavoritesRepository::new(self.api.clone())),
            self.jobs(),
            self.session(),
            Arc::new(DefaultClock),
        )
    }

    fn session(&self) -> SessionStore {
        SessionStore::new(self.store.clone())
    }

    fn cache(&self) -> TtlCache {
        TtlCache::new(self.store.clone(), Arc::new(DefaultClock))
    }
}

/// Run `args` against the configured backend, writing results to `out`.
pub async fn run(args: CliArgs, settings: &ClientSettings, out: &mut impl Write) -> Result<()> {
    let wiring = Wiring::connect(settings)?;
    debug!(command = ?args.command, "running command");
    match args.command {
        Command::Jobs(JobsCommand::Search { filters, limit }) => {
            search_jobs(&wiring, filters.into(), limit, out).await
        }
        Command::Jobs(JobsCommand::Posted { refresh }) => posted_jobs(&wiring, refresh, out).await,
        Command::Jobs(JobsCommand::Saved) => list_saved_jobs(&wiring, out).await,
        Command::Jobs(JobsCommand::Save { job_id }) => {
            save_job(&wiring, &JobId::new(job_id)?, out).await
        }
        Command::Jobs(JobsCommand::Unsave { job_id }) => {
            let id = JobId::new(job_id)?;
            wiring.saved_jobs().remove_saved_job(&id).await?;
            writeln!(out, "removed {id}")?;
            Ok(())
        }
        Command::Applications => list_applications(&wiring, out).await,
        Command::History(command) => history(&wiring, command, out),
        Command::Recommend { skills } => recommend(&wiring, skills, out).await,
        Command::Login {
            email,
            password,
            company,
        } => login(&wiring, email, password, company, out).await,
        Command::Logout => {
            CompanyAccountsService::new(
                Arc::new(RestCompanyRepository::new(wiring.api.clone())),
                wiring.session(),
                wiring.cache(),
            )
            .log_out()?;
            wiring.analytics.set_user_id(None);
            writeln!(out, "signed out")?;
            Ok(())
        }
        Command::ClearCache => {
            wiring.api.clear_cache()?;
            writeln!(out, "cache cleared")?;
            Ok(())
        }
        Command::Link { url } => {
            let route = parse_deep_link(&url).ok_or_else(|| eyre!("unrecognised link: {url}"))?;
            writeln!(out, "{route}")?;
            Ok(())
        }
        Command::UploadImage { path, folder } => upload_image(&wiring, &path, folder, out).await,
    }
}

async fn search_jobs(
    wiring: &Wiring,
    filters: JobFilters,
    limit: usize,
    out: &mut impl Write,
) -> Result<()> {
    let jobs = wiring
        .jobs()
        .list_recent(limit)
        .await
        .wrap_err("fetch recent jobs")?;
    let searched = filters.keywords.clone();

    let mut search = JobSearch::new(jobs);
    let results = search.apply(Some(filters));
    if let Some(keywords) = searched {
        let mut history =
            SearchHistory::new(wiring.store.clone()).with_analytics(wiring.analytics.clone());
        history.load()?;
        history.record_search(&keywords, results.len())?;
    }
    for job in results {
        writeln!(out, "{}\t{}\t{}\t{}", job.id, job.title, job.company, job.salary)?;
    }
    Ok(())
}

async fn posted_jobs(wiring: &Wiring, refresh: bool, out: &mut impl Write) -> Result<()> {
    let mut service = CompanyJobsService::new(
        Arc::new(RestJobRepository::new(wiring.api.clone())),
        wiring.session(),
        wiring.cache(),
        Arc::new(DefaultClock),
    );
    for job in service.fetch_jobs(refresh).await? {
        writeln!(out, "{}\t{}\t{}", job.id, job.title, job.category)?;
    }
    Ok(())
}

async fn list_saved_jobs(wiring: &Wiring, out: &mut impl Write) -> Result<()> {
    let mut service = wiring.saved_jobs();
    for job in service.fetch_saved_jobs().await? {
        writeln!(out, "{}\t{}\t{}", job.id, job.title, job.company)?;
    }
    Ok(())
}

async fn save_job(wiring: &Wiring, job_id: &JobId, out: &mut impl Write) -> Result<()> {
    let job = wiring
        .jobs()
        .find(job_id)
        .await
        .wrap_err("look up job")?
        .ok_or_else(|| eyre!("job {job_id} not found"))?;
    let title = job.title.clone();
    wiring.saved_jobs().save_job(job).await?;
    writeln!(out, "saved {job_id}\t{title}")?;
    Ok(())
}

async fn list_applications(wiring: &Wiring, out: &mut impl Write) -> Result<()> {
    let mut service = ApplicationsService::new(
        Arc::new(RestApplicationRepository::new(wiring.api.clone())),
        wiring.session(),
        Arc::new(DefaultClock),
    );
    service.fetch_applications().await?;
    for application in service.applications() {
        writeln!(
            out,
            "{}\t{}\t{}\t{:?}",
            application.id, application.job_title, application.company, application.status
        )?;
    }
    let stats = service.stats();
    writeln!(
        out,
        "total={} applied={} screening={} interview={} offer={} rejected={} withdrawn={}",
        stats.total,
        stats.applied,
        stats.screening,
        stats.interview,
        stats.offer,
        stats.rejected,
        stats.withdrawn
    )?;
    Ok(())
}

fn history(wiring: &Wiring, command: HistoryCommand, out: &mut impl Write) -> Result<()> {
    let mut history = SearchHistory::new(wiring.store.clone());
    history.load()?;
    match command {
        HistoryCommand::List => {
            for term in history.terms() {
                writeln!(out, "{term}")?;
            }
        }
        HistoryCommand::Add { term } => history.add_term(&term)?,
        HistoryCommand::Remove { term } => history.remove_term(&term)?,
        HistoryCommand::Clear => history.clear()?,
    }
    Ok(())
}

async fn recommend(wiring: &Wiring, skills: Vec<String>, out: &mut impl Write) -> Result<()> {
    let session = wiring.session();
    let profile = UserProfile {
        id: session.require_user_id()?,
        name: session.display_name()?,
        email: String::new(),
        bio: None,
        skills,
        experience: None,
        profile_image: None,
    };
    let mut history = SearchHistory::new(wiring.store.clone());
    let terms = history.load()?.to_vec();

    let mut service = RecommendationsService::new(
        Arc::new(RestJobRepository::new(wiring.api.clone())),
        wiring.store.clone(),
        session,
    );
    for job in service.fetch_recommendations(&profile, &terms).await? {
        writeln!(out, "{}\t{}\t{}", job.id, job.title, job.company)?;
    }
    Ok(())
}

async fn login(
    wiring: &Wiring,
    email: String,
    password: String,
    company: bool,
    out: &mut impl Write,
) -> Result<()> {
    if company {
        let service = CompanyAccountsService::new(
            Arc::new(RestCompanyRepository::new(wiring.api.clone())),
            wiring.session(),
            wiring.cache(),
        );
        let account = service
            .log_in(&CompanyLogin {
                email,
                password: Password::new(password),
            })
            .await?;
        wiring.analytics.set_user_id(Some(account.id.clone()));
        writeln!(out, "signed in as {} ({})", account.company_name, account.email)?;
    } else {
        let service = AuthService::new(
            Arc::new(RestIdentityProvider::new(wiring.api.clone())),
            wiring.session(),
        );
        let user = service.sign_in(&email, &password).await?;
        wiring.analytics.set_user_id(Some(user.user_id.clone()));
        writeln!(out, "signed in as {}", user.email)?;
    }
    Ok(())
}

async fn upload_image(
    wiring: &Wiring,
    path: &Path,
    folder: Option<String>,
    out: &mut impl Write,
) -> Result<()> {
    let (endpoint, preset) = wiring.settings.media_upload()?;
    let uploader = CloudinaryUploader::new(endpoint, preset, wiring.settings.request_timeout())
        .wrap_err("build media uploader")?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| eyre!("image path must name a file: {}", path.display()))?;
    let content_type = content_type_for(file_name)
        .ok_or_else(|| eyre!("unsupported image type: {file_name}"))?;
    let bytes = read_file(path, file_name)?;

    let mut image = ImageUpload::new(file_name, content_type, bytes);
    if let Some(folder) = folder {
        image.folder = folder;
    }
    let url = uploader.upload_image(&image).await?;
    writeln!(out, "{url}")?;
    Ok(())
}

fn read_file(path: &Path, file_name: &str) -> Result<Vec<u8>> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .wrap_err_with(|| format!("open directory '{}'", parent.display()))?;
    dir.read(file_name)
        .wrap_err_with(|| format!("read image '{}'", path.display()))
}

/// MIME type for an image file name, judged by extension.
fn content_type_for(file_name: &str) -> Option<&'static str> {
    let (_, extension) = file_name.rsplit_once('.')?;
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}
