//! tangle-account CLI - inspect resolved settings and derived addresses
//!
//!   tangle-account settings                      → Resolved settings summary
//!   tangle-account address <index> [--checksum]  → Derived address at index
//!   tangle-account node-info                     → getNodeInfo on the configured node
//!
//! Configuration comes from the environment (see `SettingsConfig::from_env`);
//! the seed from `TANGLE_ACCOUNT_SEED`, or the empty seed when unset.
//!
//! Output format:
//!   --json     Output raw JSON (default for non-tty)
//!   --pretty   Pretty-print JSON (default for tty)

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use tangle_account::core::consts::env as vars;
use tangle_account::logging::init_logging;
use tangle_account::{default_settings, SecurityLevel, Settings, SettingsConfig};
use tracing::debug;

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("tangle-account {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = match opts.command.as_deref() {
        Some("settings") => cmd_settings(),
        Some("address") | Some("addr") => cmd_address(&opts),
        Some("node-info") => cmd_node_info(),
        Some(cmd) => Err(anyhow!("Unknown command: {}", cmd)),
        None => {
            print_usage();
            return;
        }
    };

    let pretty = opts.pretty || (!opts.json && std::io::stdout().is_terminal());
    let render = |v: &Value| {
        if pretty { serde_json::to_string_pretty(v) } else { serde_json::to_string(v) }
            .unwrap_or_else(|_| v.to_string())
    };

    match result {
        Ok(output) => println!("{}", render(&output)),
        Err(e) => {
            eprintln!("{}", render(&json!({"error": format!("{:#}", e)})));
            std::process::exit(1);
        }
    }
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    index: Option<String>,
    security: Option<String>,
    count: Option<String>,
    checksum: bool,
    json: bool,
    pretty: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--json" => opts.json = true,
                "--pretty" => opts.pretty = true,
                "--checksum" | "-c" => opts.checksum = true,
                "--security" | "-s" => {
                    if i + 1 < args.len() {
                        opts.security = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--count" | "-n" => {
                    if i + 1 < args.len() {
                        opts.count = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                _ => positional.push(arg.clone()),
            }
            i += 1;
        }

        let mut positional = positional.into_iter();
        opts.command = positional.next();
        opts.index = positional.next();
        opts
    }
}

fn resolve_settings() -> Result<Settings> {
    let mut partial = SettingsConfig::from_env()?.into_partial()?;
    if let Ok(seed) = env::var(vars::SEED) {
        partial = partial.with_seed(seed);
    } else {
        debug!("{} unset, using the empty seed", vars::SEED);
    }
    Ok(default_settings(Some(partial))?)
}

fn cmd_settings() -> Result<Value> {
    Ok(resolve_settings()?.summary())
}

fn cmd_address(opts: &ParsedArgs) -> Result<Value> {
    let settings = resolve_settings()?;
    let index: u64 = opts
        .index
        .as_deref()
        .ok_or_else(|| anyhow!("usage: tangle-account address <index>"))?
        .parse()
        .context("index")?;
    let security = match opts.security.as_deref() {
        Some(raw) => SecurityLevel::parse(raw).ok_or_else(|| anyhow!("invalid security level '{}'", raw))?,
        None => settings.security_level,
    };
    let count: u64 = opts.count.as_deref().unwrap_or("1").parse().context("count")?;

    let addresses = (index..index + count.max(1))
        .map(|i| {
            let address = settings.addr_gen.generate(i, security, opts.checksum)?;
            Ok(json!({"index": i, "address": address}))
        })
        .collect::<Result<Vec<Value>>>()?;
    Ok(json!({"security_level": security.level(), "addresses": addresses}))
}

fn cmd_node_info() -> Result<Value> {
    let settings = resolve_settings()?;
    let rt = tokio::runtime::Runtime::new().context("runtime")?;
    let info = rt.block_on(settings.api.get_node_info())?;
    Ok(serde_json::to_value(info)?)
}

fn print_usage() {
    println!(
        r#"tangle-account - account settings inspector

USAGE:
    tangle-account <COMMAND> [OPTIONS]

COMMANDS:
    settings                 Print the resolved settings
    address <index>          Derive the address at <index>
    node-info                Query the configured node

OPTIONS:
    -c, --checksum           Append the address checksum
    -s, --security <LEVEL>   Security level (1-3 or low/medium/high)
    -n, --count <N>          Derive N consecutive addresses
        --json               Compact JSON output
        --pretty             Pretty JSON output
    -h, --help               Show this help
    -V, --version            Show version

ENVIRONMENT:
    TANGLE_ACCOUNT_NODE      Node URI (default http://localhost:14265)
    TANGLE_ACCOUNT_MWM       Minimum weight magnitude (default 14)
    TANGLE_ACCOUNT_DEPTH     Tip selection depth (default 3)
    TANGLE_ACCOUNT_SECURITY  Security level (default medium)
    TANGLE_ACCOUNT_SEED      Seed (default: empty seed, no funds)
    TANGLE_ACCOUNT_LOG_JSON  Set to 1 for JSON logs"#
    );
}
