use anyhow::Context;
use clap::Parser;
use ember_dns_domain::{DnsOrder, HttpMethod, ResolverConfig};
use ember_dns_resolver::{LookupOptions, ResolveOptions, Resolver, RrAnswers};
use tracing::debug;

#[derive(Parser)]
#[command(name = "ember-dig")]
#[command(version)]
#[command(about = "Query DNS records over DoH (RFC 8484)")]
struct Cli {
    /// Name to resolve
    name: String,

    /// Record type (A, AAAA, MX, TXT, ..., or ANY)
    #[arg(short = 't', long = "type", default_value = "A")]
    rrtype: String,

    /// DoH servers, in order (repeatable)
    #[arg(short = 's', long = "server")]
    servers: Vec<String>,

    /// Use HTTP POST instead of GET
    #[arg(long)]
    post: bool,

    /// Per-attempt timeout in milliseconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Attempts per server
    #[arg(long)]
    tries: Option<u32>,

    /// Add an EDNS client-subnet hint (e.g. 192.0.2.0/24)
    #[arg(long)]
    ecs: Option<String>,

    /// Demote failing servers to the end of the rotation
    #[arg(long)]
    smart_rotate: bool,

    /// Run lookup (hostname -> address) instead of a record query
    #[arg(long)]
    lookup: bool,

    /// Sort lookup results IPv4-first
    #[arg(long)]
    ipv4first: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "ember_dns_resolver={level},ember_dns_domain={level},ember_dig={level}"
            ))
        });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let mut config = ResolverConfig::default();
    if !cli.servers.is_empty() {
        config.servers = cli.servers.clone();
    }
    if cli.post {
        config.method = HttpMethod::Post;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_ms = timeout;
    }
    if let Some(tries) = cli.tries {
        config.tries = tries;
    }
    if cli.ipv4first {
        config.dns_order = DnsOrder::Ipv4First;
    }
    config.smart_rotate = cli.smart_rotate;

    let resolver = Resolver::with_config(config).context("building resolver")?;
    debug!(servers = ?resolver.get_servers(), "Resolver ready");

    let output = if cli.lookup {
        let addrs = resolver
            .lookup(
                &cli.name,
                &LookupOptions {
                    all: true,
                    ..Default::default()
                },
            )
            .await?;
        serde_json::to_value(addrs)?
    } else {
        let opts = ResolveOptions {
            ttl: true,
            ecs_subnet: cli.ecs.clone(),
            ..Default::default()
        };
        answers_to_json(resolver.resolve(&cli.name, &cli.rrtype, &opts).await?)?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn answers_to_json(answers: RrAnswers) -> serde_json::Result<serde_json::Value> {
    match answers {
        RrAnswers::A(v) => serde_json::to_value(v),
        RrAnswers::Aaaa(v) => serde_json::to_value(v),
        RrAnswers::Caa(v) => serde_json::to_value(v),
        RrAnswers::Cert(v) => serde_json::to_value(v),
        RrAnswers::Cname(v) => serde_json::to_value(v),
        RrAnswers::Mx(v) => serde_json::to_value(v),
        RrAnswers::Naptr(v) => serde_json::to_value(v),
        RrAnswers::Ns(v) => serde_json::to_value(v),
        RrAnswers::Ptr(v) => serde_json::to_value(v),
        RrAnswers::Soa(v) => serde_json::to_value(v),
        RrAnswers::Srv(v) => serde_json::to_value(v),
        RrAnswers::Tlsa(v) => serde_json::to_value(v),
        RrAnswers::Txt(v) => serde_json::to_value(v),
        RrAnswers::Any(v) => serde_json::to_value(v),
    }
}
