/// Console commands for the standalone host
///
/// Commands represent requests typed by an operator (imperative).
/// They are parsed from one input line and executed against the dispatcher.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use uuid::Uuid;

use region_sounds::geometry::{Location, WorldId};
use region_sounds::playback::Subject;
use region_sounds::region::{AnyWorld, JsonRegionStore, RegionStore, SoundRegion};
use region_sounds::trigger::{Trigger, TriggerEvent, TriggerKind};
use region_sounds::{AppResult, SoundDispatcher};

pub const HELP: &str = "\
Commands:
  event <Trigger Name> <world> <x> <y> <z> [discriminator] [--cancelled] [--subject <uuid>]
  play <sound> [volume] [pitch] [--subject <uuid>]
  reload
  regions
  region add <name> <world> <x1> <y1> <z1> <x2> <y2> <z2>
  region remove <name>
  toggle <uuid>
  help
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Simulate a host event
    Event {
        kind: TriggerKind,
        location: Location,
        discriminator: Option<String>,
        cancelled: bool,
        subject: Option<Uuid>,
    },

    /// Play a sound to one subject, the console by default
    Play {
        sound: String,
        subject: Option<Uuid>,
        volume: Option<f32>,
        pitch: Option<f32>,
    },

    /// Reload sounds and regions from disk
    Reload,

    /// List registered regions
    Regions,

    RegionAdd {
        name: String,
        first: Location,
        second: Location,
    },

    RegionRemove { name: String },

    /// Flip a subject's sound toggle
    Toggle { subject: Uuid },

    Help,

    /// Quit the application
    Quit,
}

/// Whether the input loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn number<T: std::str::FromStr>(token: Option<&str>, what: &str) -> AppResult<T> {
    let token = token.ok_or_else(|| anyhow!("missing {}", what))?;
    token
        .parse()
        .map_err(|_| anyhow!("{} is not a valid {}", token, what))
}

fn location(world: Option<&str>, coords: &[&str]) -> AppResult<Location> {
    let world = world.ok_or_else(|| anyhow!("missing world"))?;
    let mut it = coords.iter().copied();
    Ok(Location::new(
        WorldId::new(world),
        number(it.next(), "x")?,
        number(it.next(), "y")?,
        number(it.next(), "z")?,
    ))
}

/// Pull an optional `--subject <uuid>` out of `tokens`.
fn split_subject<'a>(tokens: &[&'a str]) -> AppResult<(Vec<&'a str>, Option<Uuid>)> {
    let mut positional = Vec::new();
    let mut subject = None;

    let mut it = tokens.iter().copied();
    while let Some(token) = it.next() {
        if token == "--subject" {
            let raw = it.next().ok_or_else(|| anyhow!("--subject needs a uuid"))?;
            subject = Some(Uuid::parse_str(raw).context("invalid subject uuid")?);
        } else {
            positional.push(token);
        }
    }

    Ok((positional, subject))
}

impl Command {
    /// Parse one input line. Empty lines parse to `None`.
    pub fn parse(line: &str) -> AppResult<Option<Command>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, rest)) = tokens.split_first() else {
            return Ok(None);
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "event" => Self::parse_event(rest)?,
            "play" => {
                let (positional, subject) = split_subject(rest)?;
                Command::Play {
                    sound: positional
                        .first()
                        .ok_or_else(|| anyhow!("missing sound"))?
                        .to_string(),
                    subject,
                    volume: positional.get(1).map(|v| number(Some(*v), "volume")).transpose()?,
                    pitch: positional.get(2).map(|v| number(Some(*v), "pitch")).transpose()?,
                }
            }
            "reload" => Command::Reload,
            "regions" => Command::Regions,
            "region" => match rest.first().copied() {
                Some("add") => {
                    if rest.len() != 9 {
                        bail!("usage: region add <name> <world> <x1> <y1> <z1> <x2> <y2> <z2>");
                    }
                    Command::RegionAdd {
                        name: rest[1].to_string(),
                        first: location(Some(rest[2]), &rest[3..6])?,
                        second: location(Some(rest[2]), &rest[6..9])?,
                    }
                }
                Some("remove") => Command::RegionRemove {
                    name: rest
                        .get(1)
                        .ok_or_else(|| anyhow!("missing region name"))?
                        .to_string(),
                },
                _ => bail!("usage: region add|remove ..."),
            },
            "toggle" => Command::Toggle {
                subject: Uuid::parse_str(rest.first().ok_or_else(|| anyhow!("missing uuid"))?)
                    .context("invalid uuid")?,
            },
            "help" | "?" => Command::Help,
            "quit" | "exit" | "stop" => Command::Quit,
            other => bail!("unknown command {:?}, type help", other),
        };

        Ok(Some(command))
    }

    /// `<Trigger Name> <world> <x> <y> <z> [discriminator] [flags]`; the trigger
    /// name is the longest leading run of words naming a trigger.
    fn parse_event(tokens: &[&str]) -> AppResult<Command> {
        let (kind, used) = (1..=tokens.len())
            .rev()
            .find_map(|n| TriggerKind::from_config_name(&tokens[..n].join(" ")).map(|k| (k, n)))
            .ok_or_else(|| anyhow!("unknown trigger in {:?}", tokens.join(" ")))?;

        let (mut positional, subject) = split_subject(&tokens[used..])?;
        let before = positional.len();
        positional.retain(|t| *t != "--cancelled");
        let cancelled = positional.len() != before;

        if positional.len() < 4 {
            bail!("usage: event <Trigger Name> <world> <x> <y> <z> [discriminator]");
        }

        Ok(Command::Event {
            kind,
            location: location(Some(positional[0]), &positional[1..4])?,
            discriminator: positional.get(4).map(|s| s.to_string()),
            cancelled,
            subject,
        })
    }
}

/// Executes commands against a running dispatcher.
pub struct Console {
    dispatcher: Arc<SoundDispatcher>,
    store: JsonRegionStore,
    data_dir: PathBuf,
    console_subject: Subject,
}

impl Console {
    pub fn new(dispatcher: Arc<SoundDispatcher>, store: JsonRegionStore, data_dir: PathBuf) -> Self {
        Self {
            dispatcher,
            store,
            data_dir,
            console_subject: Subject::new(
                Uuid::nil(),
                Location::new(WorldId::new("world"), 0.0, 64.0, 0.0),
            ),
        }
    }

    /// Reload regions, then sounds.
    pub fn reload(&self) {
        self.dispatcher
            .regions()
            .load_from(&self.store, &AnyWorld)
            .log("regions");
        self.dispatcher.reload(&self.data_dir);
    }

    /// A named subject stands where the console does.
    fn play_target(&self, subject: Option<Uuid>) -> Subject {
        match subject {
            Some(id) => Subject::new(id, self.console_subject.location.clone()),
            None => self.console_subject.clone(),
        }
    }

    pub fn execute(&self, line: &str) -> AppResult<Flow> {
        let Some(command) = Command::parse(line)? else {
            return Ok(Flow::Continue);
        };

        match command {
            Command::Event {
                kind,
                location,
                discriminator,
                cancelled,
                subject,
            } => {
                let trigger = Trigger::new(kind, discriminator)
                    .ok_or_else(|| anyhow!("{} needs a discriminator", kind))?;

                let mut event = TriggerEvent::new(trigger, location.clone()).cancelled(cancelled);
                if let Some(id) = subject {
                    event = event.with_subject(Subject::new(id, location));
                }

                let outcome = self.dispatcher.dispatch(&event);
                println!(
                    "✓ {}: {} played, {} scheduled, {} dropped (configuration #{})",
                    kind, outcome.played, outcome.scheduled, outcome.dropped, outcome.generation
                );
            }
            Command::Play {
                sound,
                subject,
                volume,
                pitch,
            } => {
                let target = self.play_target(subject);
                let delivered = self.dispatcher.play_now(&sound, std::slice::from_ref(&target), volume, pitch)?;
                if delivered == 0 {
                    println!("✗ {} was not played for {}", sound, target.id);
                }
            }
            Command::Reload => {
                self.reload();
                println!("✓ Reloaded");
            }
            Command::Regions => {
                let regions = self.dispatcher.regions().snapshot();
                println!("{} region(s):", regions.len());
                for region in regions.iter() {
                    println!(
                        "  {} [{}] {} {} -> {}{}",
                        region.name(),
                        region.id(),
                        region.world(),
                        region.min_diagonal().pos,
                        region.max_diagonal().pos,
                        region
                            .description()
                            .map(|d| format!(" ({})", d))
                            .unwrap_or_default()
                    );
                }
            }
            Command::RegionAdd { name, first, second } => {
                if self.dispatcher.regions().find_by_name(&name).is_some() {
                    bail!("a region named {} already exists", name);
                }
                let region = SoundRegion::new(&name, &first, &second, None, None)?;
                let region = self.dispatcher.add_region(region)?;
                self.dispatcher.regions().save(&self.store, region.id())?;
                println!("✓ Added region {} ({})", region.name(), region.id());
            }
            Command::RegionRemove { name } => {
                let region = self
                    .dispatcher
                    .regions()
                    .find_by_name(&name)
                    .ok_or_else(|| anyhow!("no region named {}", name))?;
                self.store.delete(region.id())?;
                self.dispatcher.remove_region(region.id());
                println!("✓ Removed region {}", region.name());
            }
            Command::Toggle { subject } => {
                let enabled = self.dispatcher.toggles().toggle(subject);
                println!("✓ Sounds {} for {}", if enabled { "enabled" } else { "disabled" }, subject);
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }
}
