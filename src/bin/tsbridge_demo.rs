//! Demo service: a handful of handlers exercising every descriptor shape.
//!
//! ```bash
//! tsbridge-demo generate --out web/src/api.ts
//! tsbridge-demo serve --addr 127.0.0.1:8080 --client-out web/src/api.ts
//! tsbridge-demo inspect --handler playlists.get_playlists
//! ```

use clap::Parser;
use tsbridge::cli::{run_cli, Cli};
use tsbridge::logging::{init_logging, LogConfig};
use tsbridge::router::MemoryRouter;
use tsbridge::{route, Registry};

mod greeter {
    use serde::{Deserialize, Serialize};
    use tsbridge::{Describe, RequestContext};

    #[derive(Debug, Deserialize, Describe)]
    pub struct Hello {
        pub name: String,
    }

    #[derive(Debug, Serialize, Describe)]
    pub struct Greeting {
        pub message: String,
    }

    pub fn hello(_ctx: &RequestContext<'_>, input: Hello) -> anyhow::Result<Greeting> {
        if input.name.trim().is_empty() {
            anyhow::bail!("name must not be empty");
        }
        Ok(Greeting {
            message: format!("Hello, {}!", input.name),
        })
    }

    pub struct Server;

    impl Server {
        pub fn greet(ctx: &RequestContext<'_>, input: Hello) -> anyhow::Result<Greeting> {
            Ok(Greeting {
                message: format!("{} greets {} (request {})", ctx.identity, input.name, ctx.request_id),
            })
        }
    }
}

mod playlists {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use tsbridge::{Describe, RequestContext};

    #[derive(Debug, Deserialize, Describe)]
    #[serde(rename_all = "camelCase")]
    pub struct GetPlaylists {
        pub owner_id: String,
        #[serde(default)]
        pub limit: Option<u32>,
    }

    #[derive(Debug, Serialize, Describe)]
    #[serde(rename_all = "camelCase")]
    pub struct Playlist {
        pub id: u64,
        pub title: String,
        pub tracks: Vec<Track>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Describe)]
    pub struct Track {
        pub title: String,
        pub seconds: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub artist: Option<String>,
    }

    pub fn get_playlists(
        _ctx: &RequestContext<'_>,
        input: GetPlaylists,
    ) -> anyhow::Result<Vec<Playlist>> {
        let created_at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap_or_default();
        let all = vec![
            Playlist {
                id: 1,
                title: format!("{}'s favourites", input.owner_id),
                tracks: vec![Track {
                    title: "Intro".to_string(),
                    seconds: 95,
                    artist: None,
                }],
                created_at,
            },
            Playlist {
                id: 2,
                title: "Late night".to_string(),
                tracks: Vec::new(),
                created_at,
            },
        ];
        let limit = input.limit.map_or(all.len(), |l| l as usize);
        Ok(all.into_iter().take(limit).collect())
    }
}

mod catalog {
    use serde::Serialize;
    use tsbridge::{Describe, Empty, RequestContext};

    /// Categories nest arbitrarily deep.
    #[derive(Debug, Serialize, Describe)]
    pub struct Category {
        pub name: String,
        pub children: Vec<Category>,
        pub parent: Option<Box<Category>>,
    }

    pub fn tree(_ctx: &RequestContext<'_>, _input: Empty) -> anyhow::Result<Category> {
        Ok(Category {
            name: "music".to_string(),
            children: vec![Category {
                name: "jazz".to_string(),
                children: Vec::new(),
                parent: None,
            }],
            parent: None,
        })
    }
}

mod status {
    use serde::Serialize;
    use tsbridge::{Describe, Empty, RequestContext};

    #[derive(Debug, Serialize, Describe)]
    pub struct Health {
        pub ok: bool,
        pub version: &'static str,
    }

    pub fn health(_ctx: &RequestContext<'_>, _input: Empty) -> anyhow::Result<Health> {
        Ok(Health {
            ok: true,
            version: env!("CARGO_PKG_VERSION"),
        })
    }
}

mod payments {
    use serde::{Deserialize, Serialize};
    use tsbridge::{Choice, Describe, RequestContext};

    /// Exactly one payment method is expected to be set.
    #[derive(Debug, Deserialize, Describe)]
    pub struct PaymentMethod {
        pub card: Choice<Card>,
        pub iban: Choice<String>,
    }

    #[derive(Debug, Deserialize, Describe)]
    #[describe(inline)]
    pub struct Card {
        pub number: String,
        pub cvc: String,
    }

    #[derive(Debug, Deserialize, Describe)]
    pub struct Charge {
        pub amount_cents: u64,
        pub method: PaymentMethod,
    }

    #[derive(Debug, Serialize, Describe)]
    pub struct Receipt {
        pub charged_cents: u64,
        pub via: String,
    }

    pub fn charge(_ctx: &RequestContext<'_>, input: Charge) -> anyhow::Result<Receipt> {
        let via = match (input.method.card.get(), input.method.iban.get()) {
            (Some(card), None) => format!("card ending {}", last_four(&card.number)),
            (None, Some(iban)) => format!("iban {iban}"),
            (Some(_), Some(_)) => anyhow::bail!("choose either card or iban, not both"),
            (None, None) => anyhow::bail!("a payment method is required"),
        };
        Ok(Receipt {
            charged_cents: input.amount_cents,
            via,
        })
    }

    fn last_four(number: &str) -> &str {
        number.get(number.len().saturating_sub(4)..).unwrap_or(number)
    }
}

fn register_all(registry: &mut Registry, router: &mut MemoryRouter) -> anyhow::Result<()> {
    registry.register(router, route!(greeter::hello)?, greeter::hello)?;
    registry.register(router, route!(greeter::Server::greet)?, greeter::Server::greet)?;
    registry.register(
        router,
        route!(playlists::get_playlists)?,
        playlists::get_playlists,
    )?;
    registry.register(router, route!(catalog::tree)?, catalog::tree)?;
    registry.register(router, route!(status::health)?, status::health)?;
    registry.register(router, route!(payments::charge)?, payments::charge)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let _guard = init_logging(&LogConfig::from_env())?;
    run_cli(Cli::parse(), register_all)
}
