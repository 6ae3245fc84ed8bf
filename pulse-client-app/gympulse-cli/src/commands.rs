//! Subcommand handlers

use std::process::ExitCode;

use clap::{Subcommand, ValueEnum};

use pulse_core::{
    gate_feature, gate_limit, Feature, FeatureGate, LimitGate, LimitKind,
    PulseContext, RouteDecision, RouteGuard,
};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the session
    Login {
        username: String,
        #[arg(long, env = "PULSE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in identity
    Whoami,
    /// Show subscription status, usage and limits
    Status,
    /// Check whether one more item fits the plan
    Can {
        #[arg(value_enum)]
        kind: LimitArg,
    },
    /// Check access to a premium feature
    Feature {
        #[arg(value_enum)]
        feature: FeatureArg,
    },
    /// Evaluate the navigation guard for a path
    Route {
        path: String,
        #[arg(long, value_enum, default_value_t = Console::Gym)]
        console: Console,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LimitArg {
    Member,
    Staff,
    Plan,
}

impl From<LimitArg> for LimitKind {
    fn from(arg: LimitArg) -> Self {
        match arg {
            LimitArg::Member => LimitKind::Member,
            LimitArg::Staff => LimitKind::Staff,
            LimitArg::Plan => LimitKind::Plan,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FeatureArg {
    Whatsapp,
    Analytics,
}

impl From<FeatureArg> for Feature {
    fn from(arg: FeatureArg) -> Self {
        match arg {
            FeatureArg::Whatsapp => Feature::WhatsApp,
            FeatureArg::Analytics => Feature::Analytics,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Console {
    Gym,
    Admin,
}

pub async fn run(context: &PulseContext, command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::Login { username, password } => login(context, &username, &password).await,
        Command::Logout => {
            context.logout();
            println!("Logged out");
            Ok(ExitCode::SUCCESS)
        }
        Command::Whoami => {
            context.start().await;
            Ok(whoami(context))
        }
        Command::Status => {
            context.start().await;
            Ok(status(context))
        }
        Command::Can { kind } => {
            context.start().await;
            Ok(can(context, kind.into()))
        }
        Command::Feature { feature } => {
            context.start().await;
            Ok(feature_access(context, feature.into()))
        }
        Command::Route { path, console } => {
            context.start().await;
            Ok(route(context, &path, console))
        }
    }
}

async fn login(context: &PulseContext, username: &str, password: &str) -> anyhow::Result<ExitCode> {
    match context.login(username, password).await {
        Ok(identity) => {
            println!("Logged in as {} ({})", identity.username, identity.role);
            if let Some(banner) = context.entitlements().trial_banner() {
                println!("{}", banner.message());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn whoami(context: &PulseContext) -> ExitCode {
    let Some(identity) = context.session().identity() else {
        eprintln!("Not logged in");
        return ExitCode::FAILURE;
    };

    println!("User:         {}", identity.username);
    println!("Role:         {}", identity.role);
    if let Some(tenant_id) = identity.tenant_id {
        println!("Tenant:       {}", tenant_id);
    }
    if let Some(plan) = &identity.plan_name {
        println!("Plan:         {}", plan);
    }
    if let Some(status) = &identity.subscription_status {
        println!("Subscription: {}", status);
    }
    ExitCode::SUCCESS
}

fn status(context: &PulseContext) -> ExitCode {
    if !context.session().is_authenticated() {
        eprintln!("Not logged in");
        return ExitCode::FAILURE;
    }

    let entitlements = context.entitlements();
    let Some(snapshot) = entitlements.snapshot() else {
        let reason = entitlements
            .last_error()
            .unwrap_or_else(|| "Subscription status has not been loaded".to_string());
        eprintln!("{}", reason);
        return ExitCode::FAILURE;
    };

    println!(
        "Plan:      {}",
        snapshot.plan_name.as_deref().unwrap_or("Trial")
    );
    println!(
        "Status:    {}{}",
        snapshot.status.as_str(),
        if snapshot.is_active { "" } else { " (inactive)" }
    );
    if let Some(days) = snapshot.days_remaining() {
        println!("Days left: {}", days);
    }
    if let Some(fetched_at) = context.entitlement_service().fetched_at() {
        println!("Fetched:   {}", fetched_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    for kind in [LimitKind::Member, LimitKind::Staff, LimitKind::Plan] {
        let check = entitlements.limit_check(kind);
        let max = check
            .max
            .map(|m| m.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!("{:<10} {}/{}", format!("{}:", kind.as_str()), check.current, max);
    }
    println!(
        "Features:  whatsapp={} analytics={}",
        entitlements.has_feature(Feature::WhatsApp),
        entitlements.has_feature(Feature::Analytics)
    );
    if let Some(banner) = entitlements.trial_banner() {
        println!("{}", banner.message());
    }
    if entitlements.needs_upgrade() {
        println!("Upgrade recommended");
    }
    ExitCode::SUCCESS
}

fn can(context: &PulseContext, kind: LimitKind) -> ExitCode {
    match gate_limit(context.entitlements().as_ref(), kind) {
        LimitGate::Proceed => {
            println!("allowed");
            ExitCode::SUCCESS
        }
        LimitGate::Blocked { title, message } => {
            println!("{}: {}", title, message);
            ExitCode::FAILURE
        }
    }
}

fn feature_access(context: &PulseContext, feature: Feature) -> ExitCode {
    match gate_feature(context.entitlements().as_ref(), feature) {
        FeatureGate::Allowed => {
            println!("{}: enabled", feature.title());
            ExitCode::SUCCESS
        }
        FeatureGate::Pending => {
            println!("{}: loading", feature.title());
            ExitCode::FAILURE
        }
        FeatureGate::Locked { title, prompt } => {
            println!("{}: {}", title, prompt);
            ExitCode::FAILURE
        }
    }
}

fn route(context: &PulseContext, path: &str, console: Console) -> ExitCode {
    let guard = match console {
        Console::Gym => RouteGuard::gym_dashboard(),
        Console::Admin => RouteGuard::admin_console(),
    };
    let decision = guard.decide(context.session().as_ref(), path);
    println!("{:?}", decision);
    if decision == RouteDecision::Render {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
