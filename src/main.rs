use anyhow::{Context, Result};
use insta_grow::config::Config;
use insta_grow::engine::campaign::{run_campaign, CampaignSettings};
use insta_grow::engine::context::{RunContext, SessionStats};
use insta_grow::engine::executor::ActionExecutor;
use insta_grow::engine::reconcile::{sweep, SweepSettings};
use insta_grow::platform::rest::InstaRest;
use insta_grow::platform::{ClientError, PlatformClient};
use insta_grow::store::whitelist::WhitelistSet;
use insta_grow::store::FollowStore;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let log_file = std::fs::File::create("insta-grow.log")?;
    tracing_subscriber::fmt()
        .with_env_filter("insta_grow=info")
        .with_writer(log_file)
        .init();

    let config = Config::load(Path::new("config.toml"))?;
    Config::load_env_file();

    println!();
    println!("  insta-grow v0.1.0");
    println!("  =================");
    println!();

    let username = Config::platform_username()?;
    let password = Config::platform_password()?;

    let client: Arc<dyn PlatformClient> = Arc::new(InstaRest::new(&config.platform.api_base));

    println!("  Logging in as @{}...", username);
    let session = match client.login(&username, &password).await {
        Ok(s) => s,
        Err(ClientError::ChallengeRequired) => {
            anyhow::bail!(
                "Login challenge issued by the platform.\n\
                 Complete the email/SMS verification in the official app, then run again."
            );
        }
        Err(e) => return Err(e).context("login failed"),
    };
    tracing::info!(user_id = session.user_id, "logged in");

    let store = FollowStore::load(Path::new(&config.storage.followed_users))?;
    let mut whitelist = WhitelistSet::load(Path::new(&config.storage.whitelist))?;

    // First run: snapshot current relationships so they are never touched.
    if whitelist.is_snapshot_empty() {
        println!("  Whitelist empty, capturing current followers/following...");
        let (followers, following) = whitelist
            .rebuild(client.as_ref(), session.user_id)
            .await
            .context("building whitelist")?;
        whitelist.save()?;
        println!(
            "  Protected: {} followers, {} following",
            followers, following
        );
    } else {
        println!(
            "  Whitelist loaded: {} users protected",
            whitelist.protected_count()
        );
    }

    let ctx = Arc::new(RunContext::new());

    // Baseline follower count for the end-of-run summary.
    match client.get_account_info(&username).await {
        Ok(info) => ctx.update_stats(|s| {
            s.start_followers = info.follower_count;
            s.current_followers = info.follower_count;
        }),
        Err(e) => tracing::warn!(error = %e, "could not fetch account info"),
    }

    // Ctrl-C requests a cooperative stop at the next candidate boundary.
    let stop_ctx = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n  Stop requested, finishing current action...");
            stop_ctx.stop();
        }
    });

    let mut executor = ActionExecutor::new(
        client.clone(),
        store,
        whitelist,
        ctx.clone(),
        Duration::from_secs(config.pacing.rate_limit_cooldown_s),
    );

    let mode = config.campaign.mode;
    let settings = CampaignSettings {
        session_size: mode.session_size(),
        delay_range: mode.delay_range(),
    };
    println!(
        "  Mode: {:?} ({} follows, {}-{}s delay)",
        mode, settings.session_size, settings.delay_range.0, settings.delay_range.1
    );

    let followed = run_campaign(
        &mut executor,
        session.user_id,
        &config.campaign.sources,
        &settings,
        &ctx,
    )
    .await?;
    println!("  Campaign done: {} followed", followed);

    if config.reconcile.enabled && ctx.is_running() {
        let swept = sweep(
            &mut executor,
            &SweepSettings {
                grace_days: config.reconcile.grace_days,
                max_actions: config.reconcile.max_unfollows,
            },
            &ctx,
        )
        .await?;
        println!("  Sweep done: {} unfollowed", swept);
    }

    // Refresh follower count for the summary.
    if let Ok(info) = client.get_account_info(&username).await {
        ctx.update_stats(|s| {
            s.current_followers = info.follower_count;
            s.followers_gained = info.follower_count as i64 - s.start_followers as i64;
        });
    }
    print_summary(&ctx.stats());

    tracing::info!("shutting down");
    Ok(())
}

fn print_summary(stats: &SessionStats) {
    println!();
    println!("  Session summary");
    println!("  ---------------");
    println!("  Followed:            {}", stats.followed_today);
    println!("  Unfollowed:          {}", stats.unfollowed_today);
    println!("  Skipped (whitelist): {}", stats.skipped_whitelisted);
    println!("  Skipped (already):   {}", stats.skipped_already_followed);
    println!("  Rate limited:        {}", stats.rate_limited);
    println!("  Failed:              {}", stats.failed);
    println!(
        "  Followers: {} -> {} ({:+})",
        stats.start_followers, stats.current_followers, stats.followers_gained
    );
}
