use std::sync::Arc;

use clap::Parser;
use homegate::{
    credentials::{CredentialProvider, EnvCredential, StaticCredential},
    hue::{ColorCommand, HueClient},
    transport::HttpTransport,
    Config, Result,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Homegate Hue light control CLI", long_about = None)]
struct Args {
    /// Light id(s) on the bridge
    id: Option<Vec<String>>,

    #[arg(short, long)]
    /// List every light on the bridge
    list: bool,

    #[arg(short, long)]
    /// Turn the light on
    on: bool,

    #[arg(short = 'f', long)]
    /// Turn the light off
    off: bool,

    #[arg(short)]
    /// Set the CIE x coordinate (0-1)
    x: Option<f64>,

    #[arg(short)]
    /// Set the CIE y coordinate (0-1)
    y: Option<f64>,

    #[arg(short, long)]
    /// Set the brightness (1-254)
    bri: Option<u8>,

    #[arg(long)]
    /// Set the hue (0-65535)
    hue: Option<u16>,

    #[arg(short, long)]
    /// Set the saturation (0-254)
    sat: Option<u8>,

    #[arg(short, long)]
    /// Bridge address, skips discovery
    address: Option<String>,

    #[arg(short, long)]
    /// Bridge user id, instead of HUE_USER_ID
    user: Option<String>,
}

impl Args {
    fn color(&self) -> Option<ColorCommand> {
        let color = ColorCommand {
            x: self.x.unwrap_or_default(),
            y: self.y.unwrap_or_default(),
            brightness: self.bri.unwrap_or_default(),
            hue: self.hue.unwrap_or_default(),
            saturation: self.sat.unwrap_or_default(),
        };
        (!color.is_power_only()).then_some(color)
    }
}

fn print_result(id: &str, res: Result<()>) {
    if let Err(e) = res {
        eprintln!("Light {id}: {e}");
    }
}

async fn list_lights(client: &HueClient) {
    let directory = match client.get_lights().await {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Failed to list lights: {e}");
            return;
        }
    };

    for skipped in directory.skipped() {
        eprintln!("Skipped light {}: {}", skipped.key, skipped.reason);
    }
    match serde_json::to_string_pretty(directory.lights()) {
        Ok(v) => println!("{v}"),
        Err(e) => eprintln!("Failed to print lights: {e}"),
    }
}

async fn modify_light(args: &Args, client: &HueClient, id: &str) {
    // at most one power action
    if args.off {
        print_result(id, client.set_power(id, false).await);
        return;
    }

    match args.color() {
        Some(color) => print_result(id, client.set_color_state(id, &color).await),
        None if args.on => print_result(id, client.set_power(id, true).await),
        None => match client.light(id).await {
            Ok(light) => match serde_json::to_string_pretty(&light) {
                Ok(v) => println!("{v}"),
                Err(e) => eprintln!("Failed to print light {id}: {e}"),
            },
            Err(e) => eprintln!("Light {id}: {e}"),
        },
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut config = Config::from_env();
    if args.address.is_some() {
        config.bridge_address = args.address.clone();
    }

    let transport = match HttpTransport::new(config.timeout) {
        Ok(v) => Arc::new(v),
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };

    let credentials: Arc<dyn CredentialProvider> = match &args.user {
        Some(user) => Arc::new(StaticCredential::new(user)),
        None => Arc::new(EnvCredential::new(homegate::config::HUE_USER_ID_VAR)),
    };

    let client = HueClient::new(
        transport,
        credentials,
        &config.discovery_url,
        config.bridge_address.clone(),
    );

    if args.list {
        list_lights(&client).await;
        return;
    }

    let ids = match &args.id {
        Some(ids) if !ids.is_empty() => ids,
        _ => {
            eprintln!("Light id is required!");
            return;
        }
    };

    for id in ids {
        modify_light(&args, &client, id).await;
    }
}
