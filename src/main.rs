// econetctl - CLI for the ecoNET24 boiler controller service
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use econetctl::config::{self, Config, Scope, resolve, save};
use econetctl::{BoilerStatus, DeviceParameters, Econet24, ParameterAddress};
use tracing_subscriber::{EnvFilter, fmt};

const LOG_ENV: &str = "ECONETCTL_LOG";

#[derive(Parser)]
#[command(
    name = "econetctl",
    version,
    about = "CLI for the ecoNET24 boiler controller service"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "URL",
        help = "Service URL (defaults to https://www.econet24.com)"
    )]
    url: Option<String>,

    #[arg(long, global = true, help = "Username override for this invocation")]
    username: Option<String>,

    #[arg(long, global = true, help = "Password override for this invocation")]
    password: Option<String>,

    #[arg(long, global = true, help = "Controller uid override for this invocation")]
    uid: Option<String>,

    #[arg(
        long,
        short = 'o',
        value_enum,
        default_value_t = OutputFormat::Pretty,
        global = true,
        help = "Output format"
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Persist --username, --password, --uid and --url to the chosen scope
    Configure {
        #[arg(
            long,
            value_enum,
            default_value_t = ScopeArg::User,
            help = "Where to write the config (local project dir or user config dir)"
        )]
        scope: ScopeArg,
    },
    /// Show current boiler readings and setpoints
    Params,
    /// Write a raw parameter value addressed by key, index or name
    SetParam {
        #[command(flatten)]
        address: AddressArgs,
        #[arg(value_name = "VALUE", allow_negative_numbers = true)]
        value: i64,
    },
    /// Switch the hot water heater (0 = off, 1 = on)
    HotWater {
        #[arg(value_name = "STATUS")]
        status: i64,
    },
    /// Put the boiler into a given state
    BoilerStatus {
        #[arg(value_enum)]
        status: BoilerStatusArg,
    },
    /// Set the central heating target temperature
    CoTemp {
        #[arg(value_name = "DEGREES")]
        value: i64,
    },
    /// Set the hot water target temperature
    HotWaterTemp {
        #[arg(value_name = "DEGREES")]
        value: i64,
    },
    /// Log in with the stored credentials and report the result
    Validate,
    /// Show current configuration (password masked)
    ConfigShow,
    /// Generate shell completion scripts
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct AddressArgs {
    #[arg(long, value_name = "KEY", help = "Address by parameter key (rmCurrNewParam)")]
    key: Option<String>,
    #[arg(long, value_name = "INDEX", help = "Address by register index (rmNewParam)")]
    index: Option<u32>,
    #[arg(long, value_name = "NAME", help = "Address by setting name (newParam)")]
    name: Option<String>,
}

impl AddressArgs {
    fn into_address(self) -> Option<ParameterAddress> {
        match (self.key, self.index, self.name) {
            (Some(key), None, None) => Some(ParameterAddress::ByKey(key)),
            (None, Some(index), None) => Some(ParameterAddress::ByIndex(index)),
            (None, None, Some(name)) => Some(ParameterAddress::ByName(name)),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BoilerStatusArg {
    TurnedOff,
    FireUp1,
    FireUp2,
    Work,
    Supervision,
    Halted,
    Stop,
    BurningOff,
    Manual,
    Alarm,
    Unsealing,
    Chimney,
    Stabilization,
    NoTransmission,
}

impl From<BoilerStatusArg> for BoilerStatus {
    fn from(value: BoilerStatusArg) -> Self {
        match value {
            BoilerStatusArg::TurnedOff => BoilerStatus::TurnedOff,
            BoilerStatusArg::FireUp1 => BoilerStatus::FireUp1,
            BoilerStatusArg::FireUp2 => BoilerStatus::FireUp2,
            BoilerStatusArg::Work => BoilerStatus::Work,
            BoilerStatusArg::Supervision => BoilerStatus::Supervision,
            BoilerStatusArg::Halted => BoilerStatus::Halted,
            BoilerStatusArg::Stop => BoilerStatus::Stop,
            BoilerStatusArg::BurningOff => BoilerStatus::BurningOff,
            BoilerStatusArg::Manual => BoilerStatus::Manual,
            BoilerStatusArg::Alarm => BoilerStatus::Alarm,
            BoilerStatusArg::Unsealing => BoilerStatus::Unsealing,
            BoilerStatusArg::Chimney => BoilerStatus::Chimney,
            BoilerStatusArg::Stabilization => BoilerStatus::Stabilization,
            BoilerStatusArg::NoTransmission => BoilerStatus::NoTransmission,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScopeArg {
    Local,
    User,
}

impl From<ScopeArg> for Scope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Local => Scope::Local,
            ScopeArg::User => Scope::User,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let cwd = std::env::current_dir().context("reading current directory")?;

    let overrides = Config {
        url: cli.url.clone(),
        username: cli.username.clone(),
        password: cli.password.clone(),
        uid: cli.uid.clone(),
    };

    match cli.command {
        Commands::Configure { scope } => configure(scope.into(), overrides, &cwd)?,
        Commands::ConfigShow => {
            let mut masked = config::load(&cwd)?;
            if masked.password.is_some() {
                masked.password = Some("*****".into());
            }
            println!("{}", serde_json::to_string_pretty(&masked)?);
        }
        Commands::Completion { shell } => print_completion(shell),
        Commands::Params => {
            let params = login(&cwd, overrides)?.read_parameters()?;
            render_params(&params, cli.output)?;
        }
        Commands::SetParam { address, value } => {
            let address = address
                .into_address()
                .ok_or_else(|| anyhow!("use exactly one of --key, --index or --name"))?;
            login(&cwd, overrides)?.write_parameter(&address, value)?;
            println!("Set {address} to {value}");
        }
        Commands::HotWater { status } => {
            login(&cwd, overrides)?.set_hot_water_heater_status(status)?;
            println!("Hot water heater status set to {status}");
        }
        Commands::BoilerStatus { status } => {
            let status = BoilerStatus::from(status);
            login(&cwd, overrides)?.set_boiler_status(status)?;
            println!("Boiler status set to {status}");
        }
        Commands::CoTemp { value } => {
            login(&cwd, overrides)?.set_co_temperature(value)?;
            println!("Central heating target set to {value}");
        }
        Commands::HotWaterTemp { value } => {
            login(&cwd, overrides)?.set_hot_water_temperature(value)?;
            println!("Hot water target set to {value}");
        }
        Commands::Validate => {
            let client = login(&cwd, overrides)?;
            println!("Login: ok (device {})", client.uid());
        }
    }

    Ok(())
}

fn login(cwd: &std::path::Path, overrides: Config) -> Result<Econet24> {
    let effective = resolve(cwd, overrides)?;
    Econet24::connect(
        &effective.url,
        &effective.username,
        &effective.password,
        &effective.uid,
    )
    .with_context(|| format!("logging in to {}", effective.url))
}

fn configure(scope: Scope, overrides: Config, cwd: &std::path::Path) -> Result<()> {
    if overrides == Config::default() {
        return Err(anyhow!(
            "nothing to save; pass --username, --password, --uid and/or --url"
        ));
    }
    let existing = config::load_scope(scope, cwd)?;
    let updated = config::merge(existing, overrides);
    let path = save(scope, &updated, cwd)?;
    println!("Saved ecoNET24 settings to {}", path.display());
    Ok(())
}

fn print_completion(shell: CompletionShell) {
    use clap_complete::{generate, shells};
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, bin, &mut std::io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, bin, &mut std::io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, bin, &mut std::io::stdout()),
        CompletionShell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, bin, &mut std::io::stdout())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn render_params(params: &DeviceParameters, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string(params)?),
        OutputFormat::Pretty => {
            let status = params
                .boiler_status()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".into());
            let rows = [
                (
                    "boiler status",
                    format!("{status} ({})", params.operation_mode),
                ),
                (
                    "boiler power",
                    format!(
                        "{}% / {:.1} kW",
                        params.boiler_power, params.boiler_power_kw
                    ),
                ),
                (
                    "CO temperature",
                    format!("{:.1} (set {:.1})", params.temp_co, params.temp_co_set),
                ),
                (
                    "HUW temperature",
                    format!("{:.1} (set {:.1})", params.temp_cwu, params.temp_cwu_set),
                ),
                ("feeder temperature", format!("{:.1}", params.temp_feeder)),
                ("CO pump", on_off(params.pump_co_works).to_string()),
                ("fan", on_off(params.fan_works).to_string()),
                ("fuel stream", format!("{:.2}", params.fuel_stream)),
                ("fuel level", format!("{}%", params.fuel_level)),
            ];
            let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
            for (label, value) in rows {
                println!("{label:width$}  {value}");
            }
        }
    }
    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}
