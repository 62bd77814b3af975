use anyhow::Context;
use clap::{Parser, Subcommand};
use laserkit::{init_logging, list_ports, DeviceConfig, GrblDriver, Job, LogProgressListener};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "laserkit", version, about = "Stream laser jobs to GRBL controllers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List candidate serial ports
    Ports,
    /// Stream a job file to the controller
    Send {
        /// Job description (JSON)
        job: PathBuf,
        /// Device configuration file (TOML or JSON); defaults apply when
        /// omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Command::Ports => {
            let ports = list_ports()?;
            if ports.is_empty() {
                println!("No candidate serial ports found.");
            }
            for port in ports {
                println!("{}\t{}", port.port_name, port.description);
            }
        }
        Command::Send { job, config } => {
            let config = match config {
                Some(path) => DeviceConfig::load_from_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => DeviceConfig::default(),
            };
            let text = std::fs::read_to_string(&job)
                .with_context(|| format!("reading job {}", job.display()))?;
            let job: Job = serde_json::from_str(&text)
                .with_context(|| format!("parsing job {}", job.display()))?;

            let driver = GrblDriver::new(config)?;
            driver.send_job(&job, &LogProgressListener)?;
        }
    }

    Ok(())
}
