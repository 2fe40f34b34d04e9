use base64::prelude::*;
use clap::Parser;

use stun_proto::fingerprint::check_fingerprint;
use stun_proto::message::Message;

#[derive(Parser)]
#[command(name = "STUN decode")]
#[command(author = "Rusty Rain <y@ngr.tc>")]
#[command(version = "0.1.0")]
#[command(about = "An example of STUN decode", long_about = None)]
struct Cli {
    /// base64 encoded message, e.g. 'AAEAECESpEIBAgMEBQYHCAkKCwyAIgAEdGVzdIAoAAR0Hqvq'
    #[arg(long)]
    data: String,
}

fn main() {
    let cli = Cli::parse();

    let decoded_data = match BASE64_STANDARD.decode(cli.data) {
        Ok(d) => d,
        Err(e) => panic!("Unable to decode base64 value: {e}"),
    };

    match Message::decode(&decoded_data) {
        Ok(message) => {
            println!("{message}");
            for (name, value) in message.attributes() {
                println!("  {name}: {value:?}");
            }
            println!("fingerprint valid: {}", check_fingerprint(&decoded_data));
        }
        Err(e) => panic!("Unable to decode message: {e}"),
    }
}
