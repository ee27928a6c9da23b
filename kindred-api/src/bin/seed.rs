//! Populates an empty database with demo celebrity accounts.
//!
//! Celebrities auto-reciprocate likes, so a fresh install has someone to match
//! with straight away. Does nothing when any user already exists.

use diesel::prelude::*;

use kindred_api::config::AppConfig;
use kindred_api::db;
use kindred_api::models::{Gender, ProfileUpdate};
use kindred_api::schema::users;
use kindred_api::services::auth_service::{self, NewAccount};
use kindred_api::services::profile_service;
use kindred_shared::clients::db::create_pool;

struct Celebrity {
    email: &'static str,
    username: &'static str,
    display_name: &'static str,
    gender: Gender,
    bio: &'static str,
    hobbies: &'static str,
    favorite_joke: &'static str,
}

const CELEBRITIES: &[Celebrity] = &[
    Celebrity {
        email: "ada@kindred.dev",
        username: "ada",
        display_name: "Ada Lovelace",
        gender: Gender::Female,
        bio: "Wrote the first program before there was a machine to run it.",
        hobbies: "Mathematics, poetry, horse riding",
        favorite_joke: "There are 10 kinds of people: those who read binary and those who don't.",
    },
    Celebrity {
        email: "nikola@kindred.dev",
        username: "nikola",
        display_name: "Nikola Tesla",
        gender: Gender::Male,
        bio: "Alternating current enthusiast. Pigeons welcome.",
        hobbies: "Wireless power, pigeons, long walks",
        favorite_joke: "I have a lot of potential, just watch the voltage.",
    },
    Celebrity {
        email: "marie@kindred.dev",
        username: "marie",
        display_name: "Marie Curie",
        gender: Gender::Female,
        bio: "Two Nobel prizes, zero patience for bad chemistry.",
        hobbies: "Radioactivity, cycling, gardening",
        favorite_joke: "I'd tell you a chemistry joke but I know I wouldn't get a reaction.",
    },
    Celebrity {
        email: "alan@kindred.dev",
        username: "alan",
        display_name: "Alan Turing",
        gender: Gender::Male,
        bio: "Looking for someone who passes my test.",
        hobbies: "Marathons, codebreaking, chess",
        favorite_joke: "Why did the machine halt? It finally found the answer.",
    },
    Celebrity {
        email: "grace@kindred.dev",
        username: "grace",
        display_name: "Grace Hopper",
        gender: Gender::Female,
        bio: "Found the first actual bug. Still debugging.",
        hobbies: "Compilers, sailing, nanoseconds",
        favorite_joke: "It's easier to ask forgiveness than it is to get permission.",
    },
];

fn main() -> anyhow::Result<()> {
    kindred_shared::middleware::init_tracing("seed");

    let config = AppConfig::load()?;
    let pool = create_pool(&config.database_url, 1)?;
    let mut conn = pool.get()?;
    db::run_migrations(&mut conn)?;

    let existing: i64 = users::table.count().get_result(&mut conn)?;
    if existing > 0 {
        tracing::info!(existing, "database already has users, skipping seed");
        return Ok(());
    }

    let password = std::env::var("KINDRED_SEED_PASSWORD").unwrap_or_else(|_| "password123".into());
    let password_hash = auth_service::hash_password(&password)?;

    for celebrity in CELEBRITIES {
        let (user, _) = auth_service::register_user(
            &mut conn,
            &NewAccount {
                email: celebrity.email,
                username: celebrity.username,
                password_hash: &password_hash,
                is_celebrity: true,
            },
        )?;

        profile_service::update_profile(
            &mut conn,
            user.id,
            ProfileUpdate {
                display_name: Some(celebrity.display_name.into()),
                gender: Some(celebrity.gender),
                bio: Some(celebrity.bio.into()),
                hobbies: Some(celebrity.hobbies.into()),
                favorite_joke: Some(celebrity.favorite_joke.into()),
                ..Default::default()
            },
        )?;

        tracing::info!(user_id = user.id, username = celebrity.username, "celebrity seeded");
    }

    tracing::info!(count = CELEBRITIES.len(), "seed complete");
    Ok(())
}
