use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{eyre::WrapErr, Report, Result};
use contracts::{Client, NoteContract, SecretKey};
use serde_json::json;
use wallet::{config::DEFAULT_CONFIG_FILE, Balance, Config, Scanner};
use zk_circuits::{
    assemble_transfer_witness,
    data::{Amount, NoteOpening, OwnerId, PublishedNote, TransferRequest},
    KeyMaterial, KeyPurpose,
};

#[derive(Parser, Debug)]
#[command(name = "wallet", version, about = "Private note transfers on an EVM ledger")]
struct Cli {
    /// Config file, layered over the defaults and under `WALLET_*` environment variables
    #[arg(long, env = "WALLET_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the commitment of a note
    Hash { owner: OwnerId, amount: Amount },
    /// Print the transfer witness, one decimal field per line
    Witness {
        spender: OwnerId,
        spend: Amount,
        recipient: OwnerId,
        send: Amount,
    },
    /// Print the record published for a note
    Record { owner: OwnerId, amount: Amount },
    /// List the notes owned by an address
    Scan {
        owner: OwnerId,
        #[arg(long)]
        json: bool,
    },
    /// List every published record
    ListAll {
        #[arg(long)]
        json: bool,
    },
    /// Create a note on the ledger, signed with the configured key
    Mint { owner: OwnerId, amount: Amount },
    /// Check that both keys can be read from the keys directory
    Keys,
}

/// Attach what the failure means for the user to the error chain
fn report(err: impl Into<wallet::Error>) -> Report {
    let err = err.into();
    let kind = err.kind();
    Report::new(err).wrap_err(kind)
}

fn contract(config: &Config) -> Result<NoteContract> {
    let client = Client::new(&config.rpc_url, config.minimum_gas_price_gwei)
        .map_err(report)?
        .with_retry(config.retry.policy());

    let contract = NoteContract::load(client, &config.contract_address).map_err(report)?;

    let Some(key) = &config.signer_key else {
        return Ok(contract);
    };

    let key: SecretKey = key
        .trim_start_matches("0x")
        .parse()
        .wrap_err("invalid signer_key")?;

    Ok(contract.with_signer(key))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = Config::load(Some(cli.config.as_path())).map_err(report)?;
    wallet::logging::init(&config.log).map_err(report)?;

    tracing::debug!(rpc_url = %config.rpc_url, contract = %config.contract_address, "loaded config");

    match cli.command {
        Command::Hash { owner, amount } => {
            println!("{}", NoteOpening::new(owner, amount).commitment().to_hex());
        }
        Command::Witness {
            spender,
            spend,
            recipient,
            send,
        } => {
            let request = TransferRequest::new(spender, spend, recipient, send);
            let witness = assemble_transfer_witness(&request).map_err(report)?;

            for field in witness.to_decimal_strings() {
                println!("{field}");
            }
        }
        Command::Record { owner, amount } => {
            let record = PublishedNote::new(owner, amount).map_err(report)?;
            println!("{}", record.as_str());
        }
        Command::Scan { owner, json } => {
            let contract = contract(&config)?;
            let scanner =
                Scanner::new(config.scan_concurrency).with_retry(config.retry.policy());

            let notes = scanner.scan(&contract, &owner).await.map_err(report)?;
            let balance = Balance::from_notes(&notes);

            if json {
                let output = json!({ "owner": owner, "notes": notes, "balance": balance });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for note in &notes {
                    println!("{} {} {}", note.commitment.to_hex(), note.state, note.amount);
                }
                println!("available: {}", balance.available);
                println!("spent:     {}", balance.spent);
            }
        }
        Command::ListAll { json } => {
            let contract = contract(&config)?;
            let scanner =
                Scanner::new(config.scan_concurrency).with_retry(config.retry.policy());

            let entries = scanner.list_all(&contract).await.map_err(report)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in &entries {
                    match &entry.note {
                        Some(note) => println!(
                            "{} {} {}",
                            note.commitment.to_hex(),
                            note.owner,
                            note.amount
                        ),
                        None => println!("{} (malformed)", entry.record.as_str()),
                    }
                }
            }
        }
        Command::Mint { owner, amount } => {
            let contract = contract(&config)?;
            let note = wallet::mint(&contract, &config.retry.policy(), owner, amount)
                .await
                .map_err(report)?;

            println!("{}", note.commitment.to_hex());
        }
        Command::Keys => {
            for purpose in [KeyPurpose::Proving, KeyPurpose::Verification] {
                let key = KeyMaterial::load(&config.keys_dir, purpose).map_err(report)?;
                println!("{purpose}: {} bytes", key.as_bytes().len());
            }
        }
    }

    Ok(())
}
