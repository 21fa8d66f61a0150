//! flashrotate CLI
//!
//! Inspects and edits a rotating record stored in a flash image file.

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flashrotate::{Config, FileFlash, Geometry, RotatingEeprom, ScanReport, SectorEeprom};
use tracing_subscriber::{fmt, EnvFilter};

/// flashrotate CLI
#[derive(Parser, Debug)]
#[command(name = "flashrotate-cli")]
#[command(about = "Wear-leveled EEPROM emulation over a flash image")]
#[command(version)]
struct Args {
    /// Flash image file
    #[arg(short, long, default_value = "./flash.img")]
    image: PathBuf,

    /// Number of sectors in the rotation pool
    #[arg(short, long, default_value = "1")]
    pool: u8,

    /// Offset of the metadata block within the record
    #[arg(short, long, default_value = "0")]
    offset: usize,

    /// Record size in bytes
    #[arg(short, long, default_value = "4096")]
    size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an erased flash image
    Format {
        /// Total sectors on the device
        #[arg(long, default_value = "256")]
        sectors: u32,

        /// Bytes per sector
        #[arg(long, default_value = "4096")]
        sector_size: usize,

        /// Sectors reserved for the system at the end of the device
        #[arg(long, default_value = "4")]
        reserved: u32,
    },

    #[command(flatten)]
    Record(RecordCommands),
}

/// Commands operating on a loaded record
#[derive(Subcommand, Debug)]
enum RecordCommands {
    /// Show pool layout and the active sector
    Info,

    /// Print bytes of the record
    Get {
        /// Start address
        address: usize,

        /// Number of bytes
        #[arg(default_value = "1")]
        len: usize,
    },

    /// Write text into the record and commit it
    Set {
        /// Start address
        address: usize,

        /// Text to store
        value: String,
    },

    /// Copy the record into a specific pool sector (default: base sector)
    Backup {
        sector: Option<u32>,
    },

    /// Erase every pool sector
    EraseAll,

    /// Hex dump of a sector (default: active sector)
    Dump {
        sector: Option<u32>,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,flashrotate=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("flashrotate v{}", flashrotate::VERSION);
    tracing::debug!("Image: {}", args.image.display());

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> flashrotate::Result<()> {
    match args.command {
        Commands::Format {
            sectors,
            sector_size,
            reserved,
        } => {
            let geometry = Geometry::new(sector_size, sectors, sectors.saturating_sub(reserved))?;
            FileFlash::create(&args.image, geometry)?;
            println!(
                "Formatted {} ({} sectors of {} bytes, last usable {})",
                args.image.display(),
                sectors,
                sector_size,
                geometry.last_usable_sector()
            );
            Ok(())
        }
        Commands::Record(command) => {
            let flash = FileFlash::open(&args.image)?;
            let config = Config::builder()
                .pool_size(args.pool)
                .metadata_offset(args.offset)
                .build();
            let mut eeprom = RotatingEeprom::new(SectorEeprom::new(flash), config)?;
            let report = eeprom.begin(args.size)?;
            run_record(&mut eeprom, &report, command)
        }
    }
}

fn run_record(
    eeprom: &mut RotatingEeprom<SectorEeprom<FileFlash>>,
    report: &ScanReport,
    command: RecordCommands,
) -> flashrotate::Result<()> {
    match command {
        RecordCommands::Info => {
            let active = eeprom.active();
            println!("base sector:     {}", eeprom.base());
            println!("last usable:     {}", eeprom.last());
            println!("reserved:        {}", eeprom.reserved());
            println!("pool size:       {}", eeprom.pool_size());
            println!("metadata offset: {}", eeprom.offset());
            println!("record size:     {}", eeprom.size());
            println!(
                "active:          sector {} (index {}, counter {})",
                active.sector, active.index, active.counter
            );
            println!("valid copies:    {:?}", report.valid);
            println!("corrupted:       {:?}", report.corrupted);
        }
        RecordCommands::Get { address, len } => {
            let bytes = eeprom.read_bytes(address, len)?;
            let hex: Vec<String> = bytes.iter().map(|b| format!("{:02X}", b)).collect();
            println!("{}", hex.join(" "));
            println!("{}", String::from_utf8_lossy(bytes));
        }
        RecordCommands::Set { address, value } => {
            eeprom.write_bytes(address, value.as_bytes())?;
            if !eeprom.is_dirty() {
                println!("Unchanged, sector {} already holds this value", eeprom.current());
                return Ok(());
            }
            eeprom.commit()?;
            println!("Committed to sector {}", eeprom.current());
        }
        RecordCommands::Backup { sector } => {
            eeprom.backup(sector)?;
            println!("Record now in sector {}", eeprom.current());
        }
        RecordCommands::EraseAll => {
            eeprom.erase_all()?;
            println!("Erased {} sectors", eeprom.pool_size());
        }
        RecordCommands::Dump { sector } => {
            let stdout = io::stdout();
            eeprom.dump(&mut stdout.lock(), sector)?;
        }
    }

    Ok(())
}
