//! Built-in schema tables for the CarFigures to Ballsdex migration.
//!
//! The export side describes what a CarFigures deployment writes; the import
//! side describes how a Ballsdex deployment reads it back. The two tables
//! use different field names and orders. They are plain data:
//! swapping in other tables needs no code changes.

use lazy_static::lazy_static;

use crate::model::{EntityDescriptor, Scalar, ScalarKind};
use crate::registry::Registry;
use crate::validate::{SchemaContext, TypeSchema};

lazy_static! {
    static ref CARFIGURES_EXPORT: Registry = Registry::from_static(vec![
        section("R", "CarType", "cartypes", &["name", "image"], vec![]),
        section("E", "Country", "countries", &["name", "image"], vec![]),
        section(
            "B",
            "Car",
            "cars",
            &[
                "cartype_id",
                "fullName",
                "weight",
                "horsepower",
                "rarity",
                "emoji",
                "collectionPicture",
                "carCredits",
                "capacityName",
                "capacityDescription",
                "createdAt",
            ],
            vec![
                ("country_id", Scalar::Null),
                ("shortName", Scalar::Null),
                ("catchNames", Scalar::Null),
                ("enabled", Scalar::Boolean(true)),
                ("tradeable", Scalar::Boolean(true)),
                ("spawnPicture", Scalar::Null),
            ],
        ),
        section(
            "BI",
            "CarInstance",
            "car instances",
            &["car_id", "player_id", "catchDate", "spawnedTime", "server"],
            vec![
                ("trade_player_id", Scalar::Null),
                ("favorite", Scalar::Boolean(false)),
                ("tradeable", Scalar::Boolean(true)),
                ("weightBonus", Scalar::Integer(0)),
                ("horsepowerBonus", Scalar::Integer(0)),
                ("locked", Scalar::Null),
            ],
        ),
        section(
            "P",
            "Player",
            "players",
            &["discord_id"],
            vec![("donationPolicy", Scalar::Integer(1)), ("privacyPolicy", Scalar::Integer(1))],
        ),
        section(
            "GC",
            "GuildConfig",
            "guild configs",
            &["guild_id"],
            vec![("spawnChannel", Scalar::Null), ("enabled", Scalar::Boolean(true))],
        ),
    ]);

    static ref BALLSDEX_IMPORT: Registry = Registry::from_static(vec![
        section("R", "Regime", "regimes", &["background", "name", "id"], vec![]),
        section("E", "Economy", "economies", &["icon", "name", "id"], vec![]),
        section(
            "S-EV",
            "Special",
            "event specials",
            &[
                "name",
                "rarity",
                "id",
                "start_date",
                "emoji",
                "background",
                "hidden",
                "tradeable",
                "end_date",
                "catch_phrase",
            ],
            vec![],
        ),
        section(
            "S-EX",
            "Special",
            "exclusive specials",
            &["name", "rarity", "id", "background", "emoji", "catch_phrase"],
            vec![],
        ),
        section(
            "B",
            "Ball",
            "balls",
            &[
                "capacity_description",
                "rarity",
                "country",
                "credits",
                "id",
                "short_name",
                "health",
                "tradeable",
                "created_at",
                "emoji_id",
                "catch_names",
                "collection_card",
                "enabled",
                "attack",
                "capacity_name",
                "regime_id",
                "wild_card",
                "economy_id",
            ],
            vec![],
        ),
        section(
            "BI",
            "BallInstance",
            "ball instances",
            &[
                "server_id",
                "ball_id",
                "player_id",
                "special_id",
                "spawned_time",
                "health_bonus",
                "favorite",
                "tradeable",
                "attack_bonus",
                "trade_player_id",
                "id",
                "catch_date",
            ],
            vec![],
        ),
        section(
            "P",
            "Player",
            "players",
            &["donation_policy", "discord_id", "id", "privacy_policy"],
            vec![],
        ),
        section(
            "GC",
            "GuildConfig",
            "guild configs",
            &["guild_id", "enabled", "id", "spawn_channel"],
            vec![],
        ),
        section("F", "Friendship", "friendships", &["player1_id", "since", "player2_id", "id"], vec![]),
        section("BU", "BlacklistedID", "blacklisted users", &["reason", "discord_id", "date", "id"], vec![]),
        section("BG", "BlacklistedGuild", "blacklisted guilds", &["reason", "discord_id", "date", "id"], vec![]),
        section("T", "Trade", "trades", &["player2_id", "date", "player1_id", "id"], vec![]),
        section("TO", "TradeObject", "trade objects", &["player_id", "id", "trade_id", "ballinstance_id"], vec![]),
    ]);

    static ref BALLSDEX_SCHEMA: SchemaContext = ballsdex_types();
}

/// Encode registry for a CarFigures deployment.
pub fn carfigures_export() -> &'static Registry {
    &CARFIGURES_EXPORT
}

/// Decode registry for a Ballsdex deployment.
pub fn ballsdex_import() -> &'static Registry {
    &BALLSDEX_IMPORT
}

/// Field kinds of the Ballsdex record types.
pub fn ballsdex_schema() -> &'static SchemaContext {
    &BALLSDEX_SCHEMA
}

fn section(
    code: &str,
    target_type: &str,
    label: &str,
    fields: &[&str],
    defaults: Vec<(&str, Scalar)>,
) -> EntityDescriptor {
    EntityDescriptor {
        code: code.to_string(),
        target_type: target_type.to_string(),
        label: label.to_string(),
        fields: fields.iter().map(|f| f.to_string()).collect(),
        defaults: defaults.into_iter().map(|(f, v)| (f.to_string(), v)).collect(),
    }
}

fn table(name: &str, fields: &[(&str, ScalarKind)]) -> TypeSchema {
    let mut schema = TypeSchema::new(name).field("id", ScalarKind::Integer);
    for &(field, kind) in fields {
        schema.add_field(field, kind);
    }
    schema
}

fn ballsdex_types() -> SchemaContext {
    use ScalarKind::*;

    let blacklist = [("discord_id", Integer), ("reason", Text), ("date", Timestamp)];

    SchemaContext::new()
        .with_type(table("Regime", &[("name", Text), ("background", Text)]))
        .with_type(table("Economy", &[("name", Text), ("icon", Text)]))
        .with_type(table(
            "Special",
            &[
                ("name", Text),
                ("catch_phrase", Text),
                ("start_date", Timestamp),
                ("end_date", Timestamp),
                ("rarity", Float),
                ("emoji", Text),
                ("background", Text),
                ("tradeable", Boolean),
                ("hidden", Boolean),
            ],
        ))
        .with_type(table(
            "Ball",
            &[
                ("country", Text),
                ("short_name", Text),
                ("catch_names", Text),
                ("regime_id", Integer),
                ("economy_id", Integer),
                ("health", Integer),
                ("attack", Integer),
                ("rarity", Float),
                ("enabled", Boolean),
                ("tradeable", Boolean),
                ("emoji_id", Integer),
                ("wild_card", Text),
                ("collection_card", Text),
                ("credits", Text),
                ("capacity_name", Text),
                ("capacity_description", Text),
                ("created_at", Timestamp),
            ],
        ))
        .with_type(table(
            "BallInstance",
            &[
                ("ball_id", Integer),
                ("player_id", Integer),
                ("trade_player_id", Integer),
                ("special_id", Integer),
                ("server_id", Integer),
                ("catch_date", Timestamp),
                ("spawned_time", Timestamp),
                ("health_bonus", Integer),
                ("attack_bonus", Integer),
                ("favorite", Boolean),
                ("tradeable", Boolean),
                ("locked", Timestamp),
            ],
        ))
        .with_type(table(
            "Player",
            &[("discord_id", Integer), ("donation_policy", Integer), ("privacy_policy", Integer)],
        ))
        .with_type(table(
            "GuildConfig",
            &[("guild_id", Integer), ("spawn_channel", Integer), ("enabled", Boolean)],
        ))
        .with_type(table(
            "Friendship",
            &[("player1_id", Integer), ("player2_id", Integer), ("since", Timestamp)],
        ))
        .with_type(table("BlacklistedID", &blacklist))
        .with_type(table("BlacklistedGuild", &blacklist))
        .with_type(table(
            "Trade",
            &[("player1_id", Integer), ("player2_id", Integer), ("date", Timestamp)],
        ))
        .with_type(table(
            "TradeObject",
            &[("trade_id", Integer), ("ballinstance_id", Integer), ("player_id", Integer)],
        ))
}
