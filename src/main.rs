use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use scholarship_match::config::Config;
use scholarship_match::db::{self, PgStore};
use scholarship_match::models::{
    AcademicInfo, FinancialBackground, PersonalInfo, Scholarship, ScholarshipStatus, StudyLevel, UserProfile,
};
use scholarship_match::report;
use scholarship_match::scoring::{self, RecommendPolicy};
use scholarship_match::search::{self, SearchCriteria};
use scholarship_match::store::{MemoryStore, ScholarshipStore};
use scholarship_match::trace;

#[derive(Parser)]
#[command(name = "scholarship-match")]
#[command(about = "Scholarship discovery and matching against student profiles", long_about = None)]
struct Cli {
    /// Work from a JSON catalog file instead of Postgres (changes are not persisted)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// JSON profile to match with when running from a catalog file
    #[arg(long, global = true)]
    profile: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load the sample catalog, profile and saved list
    Seed,
    /// Import scholarships from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Create or update a user's academic and personal profile
    Profile {
        #[arg(long)]
        user: String,
        /// On the 0.0 to 4.0 scale
        #[arg(long)]
        gpa: f64,
        #[arg(long)]
        major: String,
        #[arg(long)]
        level: StudyLevel,
        #[arg(long)]
        citizenship: String,
        #[arg(long)]
        institution: Option<String>,
        /// low | medium | high
        #[arg(long)]
        financial_background: Option<FinancialBackground>,
        /// Repeat for each activity
        #[arg(long = "extracurricular")]
        extracurriculars: Vec<String>,
    },
    /// Rank scholarships for a user profile
    Recommend {
        #[arg(long)]
        user: Option<String>,
        /// score | eligible
        #[arg(long)]
        policy: Option<RecommendPolicy>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Filter the catalog by keyword, level, amount and deadline
    Search {
        #[arg(long, default_value = "")]
        keyword: String,
        #[arg(long)]
        level: Option<StudyLevel>,
        #[arg(long, default_value_t = 0.0)]
        min_amount: f64,
        /// Upper amount bound; the UI slider tops out at 50000
        #[arg(long)]
        max_amount: Option<f64>,
        /// Only deadlines within the next 30 days
        #[arg(long)]
        deadline_soon: bool,
    },
    /// Save a scholarship to a user's list
    Save {
        #[arg(long)]
        user: String,
        #[arg(long)]
        scholarship: String,
    },
    /// Remove a scholarship from a user's list
    Unsave {
        #[arg(long)]
        user: String,
        #[arg(long)]
        scholarship: String,
    },
    /// Set the application status of a saved scholarship
    Status {
        #[arg(long)]
        user: String,
        #[arg(long)]
        scholarship: String,
        #[arg(long)]
        status: ScholarshipStatus,
    },
    /// Attach notes to a saved scholarship (omit --notes to clear)
    Notes {
        #[arg(long)]
        user: String,
        #[arg(long)]
        scholarship: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List a user's saved scholarships
    Saved {
        #[arg(long)]
        user: String,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        user: Option<String>,
        /// score | eligible
        #[arg(long)]
        policy: Option<RecommendPolicy>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn read_profile(path: &Path) -> anyhow::Result<UserProfile> {
    let profile: UserProfile = read_json(path)?;
    profile
        .validate()
        .map_err(|err| anyhow::anyhow!("invalid profile in {}: {err}", path.display()))?;
    Ok(profile)
}

async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to a Postgres instance, or pass --catalog")?;

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn open_store(cli: &Cli, config: &Config) -> anyhow::Result<(Box<dyn ScholarshipStore>, Option<UserProfile>)> {
    let file_profile: Option<UserProfile> = cli.profile.as_deref().map(read_profile).transpose()?;

    let Some(catalog) = &cli.catalog else {
        let store: Box<dyn ScholarshipStore> = Box::new(PgStore::new(connect(config).await?));
        return Ok((store, file_profile));
    };

    let scholarships: Vec<Scholarship> = read_json(catalog)?;
    info!(count = scholarships.len(), path = %catalog.display(), "loaded catalog file");

    let mut memory = MemoryStore::new(scholarships);
    if let Some(profile) = &file_profile {
        memory = memory.with_profile(profile.clone());
    }

    let store: Box<dyn ScholarshipStore> = Box::new(memory);
    Ok((store, file_profile))
}

async fn resolve_profile(
    store: &dyn ScholarshipStore,
    user: Option<&str>,
    file_profile: Option<UserProfile>,
) -> anyhow::Result<Option<UserProfile>> {
    match user {
        Some(user) => {
            let profile = store.get_profile(user).await?;
            if profile.is_none() {
                info!(user, "no profile on file, falling back to featured scholarships");
            }
            Ok(profile)
        }
        None => Ok(file_profile),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    trace::init_tracing(config.log_format);

    let cli = Cli::parse();

    if let Commands::InitDb = cli.command {
        let pool = connect(&config).await?;
        db::init_db(&pool).await?;
        println!("Schema ready.");
        return Ok(());
    }

    let (store, file_profile) = open_store(&cli, &config).await?;
    let store = store.as_ref();

    match cli.command {
        // migrations ran above
        Commands::InitDb => {}
        Commands::Seed => {
            let count = db::seed(store).await?;
            println!("Seeded {count} scholarships.");
        }
        Commands::Import { csv } => {
            let imported = db::import_csv(store, &csv).await?;
            println!("Imported {imported} scholarships from {}.", csv.display());
        }
        Commands::Profile {
            user,
            gpa,
            major,
            level,
            citizenship,
            institution,
            financial_background,
            extracurriculars,
        } => {
            let profile = UserProfile {
                user_id: user,
                academic_info: AcademicInfo {
                    gpa,
                    major,
                    study_level: level,
                    institution,
                },
                personal_info: PersonalInfo {
                    citizenship,
                    financial_background,
                    extracurriculars: (!extracurriculars.is_empty()).then_some(extracurriculars),
                },
            };
            store.upsert_profile(&profile).await?;
            info!(user = %profile.user_id, "profile saved");
            println!(
                "Profile saved for {}: {} in {}, GPA {:.2}.",
                profile.user_id, profile.academic_info.study_level, profile.academic_info.major, profile.academic_info.gpa
            );
        }
        Commands::Recommend { user, policy, limit } => {
            let scholarships = store.list_scholarships().await?;
            let profile = resolve_profile(store, user.as_deref(), file_profile).await?;
            let policy = policy.unwrap_or(config.recommend_policy);
            let recommended = scoring::recommend_for(&scholarships, profile.as_ref(), policy);

            if recommended.is_empty() {
                println!("No matching scholarships found.");
                return Ok(());
            }

            match profile {
                Some(_) => println!("Top scholarships by match score:"),
                None => println!("Featured scholarships:"),
            }
            for entry in recommended.iter().take(limit) {
                println!(
                    "- [{}] {} ({}) {}% match, {:.0} {}, due {}",
                    entry.scholarship.id,
                    entry.scholarship.name,
                    entry.scholarship.provider,
                    entry.score,
                    entry.scholarship.amount.value,
                    entry.scholarship.amount.currency,
                    entry.scholarship.deadline.format("%Y-%m-%d")
                );
            }
        }
        Commands::Search {
            keyword,
            level,
            min_amount,
            max_amount,
            deadline_soon,
        } => {
            let scholarships = store.list_scholarships().await?;
            let criteria = SearchCriteria {
                keyword,
                study_level: level,
                min_amount,
                max_amount,
                deadline_within_30_days: deadline_soon,
            };
            let results = search::search(&scholarships, &criteria, Utc::now());

            if results.is_empty() {
                println!("No scholarships match these filters.");
                return Ok(());
            }

            for scholarship in results {
                println!(
                    "- [{}] {} ({}) {:.0} {} {}, due {}",
                    scholarship.id,
                    scholarship.name,
                    scholarship.provider,
                    scholarship.amount.value,
                    scholarship.amount.currency,
                    scholarship.amount.kind.as_str(),
                    scholarship.deadline.format("%Y-%m-%d")
                );
            }
        }
        Commands::Save { user, scholarship } => {
            let saved = store.save_scholarship(&user, &scholarship).await?;
            println!("Saved {} for {} ({}).", saved.scholarship_id, saved.user_id, saved.status);
        }
        Commands::Unsave { user, scholarship } => {
            if store.remove_saved(&user, &scholarship).await? {
                println!("Removed {scholarship} from {user}'s list.");
            } else {
                println!("{scholarship} was not saved for {user}.");
            }
        }
        Commands::Status {
            user,
            scholarship,
            status,
        } => {
            let saved = store.update_status(&user, &scholarship, status).await?;
            println!("Status for {} is now {}.", saved.scholarship_id, saved.status);
        }
        Commands::Notes {
            user,
            scholarship,
            notes,
        } => {
            let saved = store.update_notes(&user, &scholarship, notes).await?;
            println!("Notes for {} updated.", saved.scholarship_id);
        }
        Commands::Saved { user } => {
            let saved = store.list_saved(&user).await?;
            if saved.is_empty() {
                println!("No saved scholarships for {user}.");
                return Ok(());
            }

            for record in saved {
                println!(
                    "- {} [{}] added {}{}",
                    record.scholarship_id,
                    record.status,
                    record.date_added.format("%Y-%m-%d"),
                    record.notes.map(|notes| format!(": {notes}")).unwrap_or_default()
                );
            }
        }
        Commands::Report { user, policy, out } => {
            let scholarships = store.list_scholarships().await?;
            let profile = resolve_profile(store, user.as_deref(), file_profile).await?;
            let saved = match profile.as_ref() {
                Some(profile) if !profile.user_id.is_empty() => store.list_saved(&profile.user_id).await?,
                _ => Vec::new(),
            };
            let report = report::build_report(
                profile.as_ref(),
                &scholarships,
                &saved,
                policy.unwrap_or(config.recommend_policy),
                Utc::now(),
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
