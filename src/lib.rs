//! Homegate - Smart Home Gateway Library
//!
//! Exposes a Hue lighting bridge and Nest thermostats over one small HTTP
//! API. The bridge is found through the vendor's discovery service the
//! first time anything needs it, after which every request reuses the same
//! session.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use homegate::hue::directory;
//!
//! // bridges key lights by decimal id strings, in no particular order
//! let listing = json!({
//!     "10": {"name": "Porch", "type": "Dimmable light", "state": {"on": true, "bri": 254, "reachable": true}},
//!     "2": {"name": "Desk", "type": "Extended color light", "state": {"on": false, "bri": 1, "reachable": true}},
//!     "3": "garbage"
//! });
//!
//! let lights = directory::decode(listing).unwrap();
//!
//! // numeric order, not string order
//! let ids: Vec<&str> = lights.lights().iter().map(|l| l.id()).collect();
//! assert_eq!(ids, ["2", "10"]);
//!
//! // broken entries are reported instead of failing the listing
//! assert_eq!(lights.skipped()[0].key, "3");
//! ```
//!
//! # API
//!
//! All routes are also documented in OpenAPI spec.
//!
//! You can view the OpenAPI [locally](http://localhost:8080/api/swagger-ui/)
//! if you have Homegate API running.
//!
//! Configuration is read from the environment:
//!
//! | Variable                | Default                          |
//! |-------------------------|----------------------------------|
//! | `HOMEGATE_PORT`         | `8080`                           |
//! | `HOMEGATE_CORS_ORIGIN`  | `http://localhost:8000`          |
//! | `HOMEGATE_TIMEOUT_SECS` | `5`                              |
//! | `HUE_DISCOVERY_URL`     | `https://discovery.meethue.com/` |
//! | `HUE_BRIDGE_ADDRESS`    | (discovered)                     |
//! | `NEST_API_URL`          | `https://developer-api.nest.com` |
//! | `HUE_USER_ID`           | (required for lights)            |
//! | `NEST_ACCESS_TOKEN`     | (required for thermostats)       |
//!
//! # CLI
//!
//! You can list and modify lights directly through the CLI.
//!
//! ```bash
//! $ homegate --help
//! Homegate Hue light control CLI
//!
//! Usage: homegate [OPTIONS] [ID]...
//!
//! Arguments:
//!   [ID]...  Light id(s) on the bridge
//!
//! Options:
//!   -l, --list               List every light on the bridge
//!   -o, --on                 Turn the light on
//!   -f, --off                Turn the light off
//!   -x <X>                   Set the CIE x coordinate (0-1)
//!   -y <Y>                   Set the CIE y coordinate (0-1)
//!   -b, --bri <BRI>          Set the brightness (1-254)
//!       --hue <HUE>          Set the hue (0-65535)
//!   -s, --sat <SAT>          Set the saturation (0-254)
//!   -a, --address <ADDRESS>  Bridge address, skips discovery
//!   -u, --user <USER>        Bridge user id, instead of HUE_USER_ID
//!   -h, --help               Print help
//!   -V, --version            Print version
//! ```
//!

pub mod config;
pub mod credentials;
mod errors;
pub mod hue;
pub mod nest;
mod routes;
pub mod transport;

pub use config::Config;
pub use errors::{Error, ErrorKind};
pub use routes::{configure, health, lights, thermostats};

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
