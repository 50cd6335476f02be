use chord_proto::chord::chord_client::ChordClient;
use chord_proto::chord::{FindSuccessorRequest, GetRequest, LocateRequest, PutRequest};
use clap::{Parser, Subcommand};
use tonic::Request;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address of the node to connect to
    #[arg(short, long, default_value = "http://127.0.0.1:5000")]
    node: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Put a key-value pair into the DHT
    Put { key: String, value: String },
    /// Get a value from the DHT
    Get { key: String },
    /// Resolve the node currently responsible for a key
    Locate { key: String },
    /// Find the successor of a raw identifier, given as hex
    FindSuccessor { id_hex: String },
}

fn parse_hex_id(s: &str) -> Result<Vec<u8>, String> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| e.to_string()))
        .collect()
}

fn hex_id(id: &[u8]) -> String {
    id.iter().map(|b| format!("{:02x}", b)).collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut client = ChordClient::connect(cli.node).await?;

    match cli.command {
        Commands::Put { key, value } => {
            let request = Request::new(PutRequest {
                key,
                value: value.into_bytes(),
            });
            let response = client.put(request).await?;
            if response.into_inner().success {
                println!("Put successful");
            } else {
                println!("Put failed");
            }
        }
        Commands::Get { key } => {
            let request = Request::new(GetRequest { key });
            match client.get(request).await {
                Ok(response) => {
                    let value = response.into_inner().value;
                    println!("Value: {}", String::from_utf8_lossy(&value));
                }
                Err(status) if status.code() == tonic::Code::NotFound => {
                    println!("Key not found");
                }
                Err(status) => return Err(Box::new(status)),
            }
        }
        Commands::Locate { key } => {
            let request = Request::new(LocateRequest { key });
            let response = client.locate(request).await?;
            let node = response.into_inner();
            println!("Owner: id={}, address={}", hex_id(&node.id), node.address);
        }
        Commands::FindSuccessor { id_hex } => {
            let id = parse_hex_id(&id_hex)?;
            let request = Request::new(FindSuccessorRequest { id });
            let response = client.find_successor(request).await?;
            let node = response.into_inner();
            println!("Successor: id={}, address={}", hex_id(&node.id), node.address);
        }
    }

    Ok(())
}
