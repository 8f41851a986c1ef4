//! Line-oriented command console
//!
//! Parses one command per line and runs it against a [`Tracker`]. Used by
//! the `initrack` binary; output is plain text.

use std::fmt::Write as _;

use thiserror::Error;

use crate::encounter::{CombatantType, EncounterError, Phase};
use crate::input::{lenient_int, strict_int};
use crate::library::LibraryError;
use crate::Tracker;

pub const HELP: &str = "\
Roster:     add <name..> <hp> <init> [player|npc]   npc <template-id> <init>
            env [init] [name..] [| description]     rm <id>   clear
HP:         hp <id> <delta>   hit <id> <n>   mend <id> <n>
Turns:      start   next   prev   end   show
Staging:    dmg <n>   heal <n>   cond <name..>
Targeting:  target <source-id>   pick <id>   amount <n>   tcond <name..>
            apply dmg|heal|cond   cancel
Library:    lib   lib add <name..> <hp> [ac] [cr]   lib rm <id>   lib reset
Conditions: conds   conds add <name..>   conds rm <name..>   conds reset
Other:      help   quit";

/// Console errors
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Encounter(#[from] EncounterError),

    #[error(transparent)]
    Library(#[from] LibraryError),
}

fn usage(msg: &str) -> ConsoleError {
    ConsoleError::Usage(msg.to_string())
}

/// Library subcommands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryCommand {
    List,
    Add {
        name: String,
        max_hp: i32,
        ac: String,
        cr: String,
    },
    Remove(String),
    Reset,
}

/// Condition vocabulary subcommands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionsCommand {
    List,
    Add(String),
    Remove(String),
    Reset,
}

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        name: String,
        max_hp: i32,
        initiative: i32,
        kind: CombatantType,
    },
    Npc {
        template_id: String,
        initiative: i32,
    },
    Env {
        initiative: Option<i32>,
        name: Option<String>,
        description: String,
    },
    Remove(String),
    Hp {
        id: String,
        delta: i32,
    },
    Hit {
        id: String,
        amount: i32,
    },
    Mend {
        id: String,
        amount: i32,
    },
    Clear,
    Start,
    Next,
    Prev,
    End,
    Show,
    PendingDamage(i32),
    PendingHeal(i32),
    StageCondition(String),
    Target(String),
    Pick(String),
    Amount(Option<i32>),
    TargetCondition(String),
    ApplyDamage,
    ApplyHeal,
    ApplyConditions,
    Cancel,
    Library(LibraryCommand),
    Conditions(ConditionsCommand),
    Help,
    Quit,
}

/// Result of running one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, ConsoleError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, args)) = tokens.split_first() else {
            return Ok(None);
        };
        let rest = args.join(" ");

        let cmd = match verb.to_lowercase().as_str() {
            "add" => parse_add(args)?,
            "npc" => match args {
                [id, init] => Command::Npc {
                    template_id: id.to_string(),
                    initiative: strict_int(init)
                        .ok_or_else(|| usage("Valid initiative required"))?,
                },
                _ => return Err(usage("usage: npc <template-id> <init>")),
            },
            "env" => parse_env(args),
            "rm" => Command::Remove(single(args, "usage: rm <id>")?),
            "hp" => match args {
                [id, delta] => Command::Hp {
                    id: id.to_string(),
                    delta: lenient_int(delta),
                },
                _ => return Err(usage("usage: hp <id> <delta>")),
            },
            "hit" => match args {
                [id, n] => Command::Hit {
                    id: id.to_string(),
                    amount: lenient_int(n),
                },
                _ => return Err(usage("usage: hit <id> <n>")),
            },
            "mend" => match args {
                [id, n] => Command::Mend {
                    id: id.to_string(),
                    amount: lenient_int(n),
                },
                _ => return Err(usage("usage: mend <id> <n>")),
            },
            "clear" => Command::Clear,
            "start" => Command::Start,
            "next" | "commit" => Command::Next,
            "prev" => Command::Prev,
            "end" => Command::End,
            "show" | "ls" => Command::Show,
            "dmg" => Command::PendingDamage(lenient_int(&rest)),
            "heal" => Command::PendingHeal(lenient_int(&rest)),
            "cond" => Command::StageCondition(non_empty(rest, "usage: cond <name>")?),
            "target" => Command::Target(single(args, "usage: target <source-id>")?),
            "pick" => Command::Pick(single(args, "usage: pick <id>")?),
            "amount" => Command::Amount(strict_int(&rest)),
            "tcond" => Command::TargetCondition(non_empty(rest, "usage: tcond <name>")?),
            "apply" => match args {
                ["dmg"] | ["damage"] => Command::ApplyDamage,
                ["heal"] => Command::ApplyHeal,
                ["cond"] | ["conds"] => Command::ApplyConditions,
                _ => return Err(usage("usage: apply dmg|heal|cond")),
            },
            "cancel" => Command::Cancel,
            "lib" => Command::Library(parse_lib(args)?),
            "conds" => Command::Conditions(parse_conds(args)?),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ConsoleError::Usage(format!("unknown command: {}", other))),
        };
        Ok(Some(cmd))
    }
}

fn single(args: &[&str], msg: &str) -> Result<String, ConsoleError> {
    match args {
        [one] => Ok(one.to_string()),
        _ => Err(usage(msg)),
    }
}

fn non_empty(text: String, msg: &str) -> Result<String, ConsoleError> {
    if text.is_empty() {
        Err(usage(msg))
    } else {
        Ok(text)
    }
}

// add <name..> <hp> <init> [player|npc]
fn parse_add(args: &[&str]) -> Result<Command, ConsoleError> {
    let mut args = args.to_vec();
    let mut kind = CombatantType::Player;
    if args.len() >= 4 {
        if let Some(k) = args.last().and_then(|s| s.parse::<CombatantType>().ok()) {
            kind = k;
            args.pop();
        }
    }
    if args.len() < 3 {
        return Err(usage("usage: add <name..> <hp> <init> [player|npc]"));
    }

    let init = args.pop().unwrap_or_default();
    let hp = args.pop().unwrap_or_default();
    let max_hp = strict_int(hp).ok_or_else(|| usage("Valid HP required"))?;
    let initiative = strict_int(init).ok_or_else(|| usage("Valid initiative required"))?;

    Ok(Command::Add {
        name: args.join(" "),
        max_hp,
        initiative,
        kind,
    })
}

// env [init] [name..] [| description]
fn parse_env(args: &[&str]) -> Command {
    let (initiative, rest) = match args.split_first() {
        Some((first, rest)) if strict_int(first).is_some() => (strict_int(first), rest),
        _ => (None, args),
    };
    let text = rest.join(" ");
    let (name, description) = match text.split_once('|') {
        Some((name, desc)) => (name.trim().to_string(), desc.trim().to_string()),
        None => (text.trim().to_string(), String::new()),
    };

    Command::Env {
        initiative,
        name: if name.is_empty() { None } else { Some(name) },
        description,
    }
}

// lib add <name..> <hp> [ac] [cr]
fn parse_lib(args: &[&str]) -> Result<LibraryCommand, ConsoleError> {
    match args {
        [] => Ok(LibraryCommand::List),
        ["reset"] => Ok(LibraryCommand::Reset),
        ["rm", id] => Ok(LibraryCommand::Remove(id.to_string())),
        ["add", rest @ ..] => {
            // HP is the earliest numeric token among the last three whose
            // follower (the AC, if present) is numeric too. Names may hold digits.
            let first = rest.len().saturating_sub(3).max(1);
            let hp_pos = (first..rest.len()).find(|&pos| {
                strict_int(rest[pos]).is_some()
                    && rest.get(pos + 1).map_or(true, |ac| strict_int(ac).is_some())
            });
            let Some(hp_pos) = hp_pos else {
                return Err(usage("usage: lib add <name..> <hp> [ac] [cr]"));
            };
            let tail = &rest[hp_pos + 1..];
            Ok(LibraryCommand::Add {
                name: rest[..hp_pos].join(" "),
                max_hp: strict_int(rest[hp_pos]).unwrap_or_default(),
                ac: tail.first().map(|s| s.to_string()).unwrap_or_default(),
                cr: tail.get(1).map(|s| s.to_string()).unwrap_or_default(),
            })
        }
        _ => Err(usage("usage: lib [add <name..> <hp> [ac] [cr] | rm <id> | reset]")),
    }
}

fn parse_conds(args: &[&str]) -> Result<ConditionsCommand, ConsoleError> {
    match args {
        [] => Ok(ConditionsCommand::List),
        ["reset"] => Ok(ConditionsCommand::Reset),
        ["add", rest @ ..] if !rest.is_empty() => Ok(ConditionsCommand::Add(rest.join(" "))),
        ["rm", rest @ ..] if !rest.is_empty() => Ok(ConditionsCommand::Remove(rest.join(" "))),
        _ => Err(usage("usage: conds [add <name..> | rm <name..> | reset]")),
    }
}

/// Parse and run one line against the tracker
pub async fn execute(tracker: &mut Tracker, line: &str) -> Reply {
    let result = match Command::parse(line) {
        Ok(Some(cmd)) => run(tracker, cmd).await,
        Ok(None) => Ok(Some(String::new())),
        Err(e) => Err(e),
    };
    match result {
        Ok(Some(text)) => Reply::Output(text),
        Ok(None) => Reply::Quit,
        Err(e) => Reply::Output(format!("error: {}", e)),
    }
}

/// Run a parsed command. `Ok(None)` asks the caller to quit.
pub async fn run(tracker: &mut Tracker, cmd: Command) -> Result<Option<String>, ConsoleError> {
    let out = match cmd {
        Command::Add {
            name,
            max_hp,
            initiative,
            kind,
        } => {
            let c = tracker
                .encounter_mut()
                .add_combatant(&name, max_hp, initiative, kind)?;
            format!("added {}", c)
        }
        Command::Npc {
            template_id,
            initiative,
        } => {
            let c = tracker.add_from_library(&template_id, initiative).await?;
            format!("added {}", c)
        }
        Command::Env {
            initiative,
            name,
            description,
        } => {
            let name = name.unwrap_or_else(|| tracker.config().lair_action_name.clone());
            let initiative = initiative.unwrap_or(tracker.config().lair_action_initiative);
            let e = tracker
                .encounter_mut()
                .add_environment_turn(&name, initiative, &description)?;
            format!("added {}", e)
        }
        Command::Remove(id) => {
            if tracker.encounter_mut().remove(&id) {
                format!("removed {}", id)
            } else {
                format!("no entry {}", id)
            }
        }
        Command::Hp { id, delta } => match tracker.encounter_mut().apply_delta(&id, delta) {
            Some(hp) => format!("{} now at {} HP", id, hp),
            None => format!("no combatant {}", id),
        },
        Command::Hit { id, amount } => match tracker.encounter_mut().apply_damage(&id, amount) {
            Some(hp) => format!("{} now at {} HP", id, hp),
            None => format!("no combatant {}", id),
        },
        Command::Mend { id, amount } => match tracker.encounter_mut().apply_heal(&id, amount) {
            Some(hp) => format!("{} now at {} HP", id, hp),
            None => format!("no combatant {}", id),
        },
        Command::Clear => {
            tracker.encounter_mut().clear_roster();
            "roster cleared".to_string()
        }
        Command::Start => {
            tracker.encounter_mut().start()?;
            render(tracker)
        }
        Command::Next => {
            tracker.encounter_mut().commit_turn()?;
            render(tracker)
        }
        Command::Prev => {
            tracker.encounter_mut().prev_turn()?;
            render(tracker)
        }
        Command::End => {
            tracker.encounter_mut().end();
            "combat ended".to_string()
        }
        Command::Show => render(tracker),
        Command::PendingDamage(n) => {
            tracker.encounter_mut().set_pending_damage(n)?;
            format!("staged {} damage", n)
        }
        Command::PendingHeal(n) => {
            tracker.encounter_mut().set_pending_heal(n)?;
            format!("staged {} healing", n)
        }
        Command::StageCondition(name) => {
            let on = tracker.encounter_mut().toggle_staged_condition(&name)?;
            format!("{} {}", if on { "staged" } else { "unstaged" }, name)
        }
        Command::Target(source) => {
            tracker.encounter_mut().open_targeting(&source)?;
            format!("targeting from {}", source)
        }
        Command::Pick(id) => {
            let on = tracker.encounter_mut().toggle_target(&id)?;
            format!("{} {}", if on { "selected" } else { "deselected" }, id)
        }
        Command::Amount(n) => {
            tracker.encounter_mut().set_target_amount(n)?;
            match n {
                Some(n) => format!("amount {}", n),
                None => "amount cleared".to_string(),
            }
        }
        Command::TargetCondition(name) => {
            let on = tracker.encounter_mut().toggle_target_condition(&name)?;
            format!("{} {}", if on { "staged" } else { "unstaged" }, name)
        }
        Command::ApplyDamage => {
            let n = tracker.encounter_mut().apply_targeted_damage()?;
            format!("damaged {} target(s)", n)
        }
        Command::ApplyHeal => {
            let n = tracker.encounter_mut().apply_targeted_heal()?;
            format!("healed {} target(s)", n)
        }
        Command::ApplyConditions => {
            let n = tracker.encounter_mut().apply_targeted_conditions()?;
            format!("updated conditions on {} target(s)", n)
        }
        Command::Cancel => {
            tracker.encounter_mut().close_targeting();
            "targeting cancelled".to_string()
        }
        Command::Library(cmd) => run_library(tracker, cmd).await?,
        Command::Conditions(cmd) => run_conditions(tracker, cmd).await?,
        Command::Help => HELP.to_string(),
        Command::Quit => return Ok(None),
    };
    Ok(Some(out))
}

async fn run_library(tracker: &Tracker, cmd: LibraryCommand) -> Result<String, ConsoleError> {
    let library = tracker.library();
    let out = match cmd {
        LibraryCommand::List => {
            let mut out = String::new();
            for t in library.list().await {
                let _ = writeln!(out, "{}  {}  HP {}  AC {}  CR {}", t.id, t.name, t.max_hp, t.ac, t.cr);
            }
            out.trim_end().to_string()
        }
        LibraryCommand::Add {
            name,
            max_hp,
            ac,
            cr,
        } => {
            let t = library.add_template(&name, max_hp, &ac, &cr).await?;
            format!("added template {} ({})", t.name, t.id)
        }
        LibraryCommand::Remove(id) => {
            let t = library.remove(&id).await?;
            format!("removed template {}", t.name)
        }
        LibraryCommand::Reset => {
            library.reset_to_defaults().await;
            "library reset to defaults".to_string()
        }
    };
    Ok(out)
}

async fn run_conditions(tracker: &Tracker, cmd: ConditionsCommand) -> Result<String, ConsoleError> {
    let vocab = tracker.conditions();
    let out = match cmd {
        ConditionsCommand::List => vocab.list().await.join(", "),
        ConditionsCommand::Add(name) => format!("added \"{}\"", vocab.add(&name).await?),
        ConditionsCommand::Remove(name) => {
            vocab.remove(&name).await?;
            format!("removed \"{}\"", name)
        }
        ConditionsCommand::Reset => {
            vocab.reset_to_defaults().await;
            "conditions reset to defaults".to_string()
        }
    };
    Ok(out)
}

/// Render the initiative order with the active entry marked
pub fn render(tracker: &Tracker) -> String {
    let enc = tracker.encounter();
    let order = enc.order();
    let mut out = String::new();

    match enc.phase() {
        Phase::Building => {
            let _ = writeln!(out, "Building roster ({} entries)", order.len());
        }
        Phase::Active => {
            let turn = if order.is_empty() {
                0
            } else {
                enc.current_index() % order.len() + 1
            };
            let _ = writeln!(out, "Round {}  Turn {}/{}", enc.round(), turn, order.len());
        }
    }

    let active = enc.current_entry().map(|e| e.id());
    let targeting = enc.targeting();
    for entry in &order {
        let marker = if Some(entry.id()) == active {
            ">"
        } else if targeting.is_some_and(|t| t.is_targeted(entry.id())) {
            "*"
        } else {
            " "
        };
        let _ = writeln!(out, "{} {}", marker, entry);
    }

    let staged = enc.staged();
    if !staged.is_empty() {
        let conds: Vec<&str> = staged.condition_toggles.iter().collect();
        let _ = writeln!(
            out,
            "staged: dmg {} heal {} toggle [{}]",
            staged.damage,
            staged.heal,
            conds.join(", ")
        );
    }

    if let Some(session) = targeting {
        let conds: Vec<&str> = session.pending_conditions().iter().collect();
        let amount = session
            .amount()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "targeting from {}: [{}] amount {} toggle [{}]",
            session.source_id(),
            session.targets().join(", "),
            amount,
            conds.join(", ")
        );
    }

    out.trim_end().to_string()
}
