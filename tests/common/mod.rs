// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Shared fixtures: the sample user list used across integration tests.

#![allow(dead_code)]

use rep_index::{IndexCoordinator, IndexedUser, NewUser, RecordStore};

pub const WENDY_ID: &str = "628555772a8b7b9926ffb917";
pub const SONIA_ID: &str = "6285557743a8bdeb2aa5dc07";
pub const STACY_ID: &str = "62855577fc3729572a693d79";

// (user_id, first_name, last_name, email, phone, active, balance)
const SAMPLE_USERS: &[(&str, &str, &str, &str, &str, bool, &str)] = &[
    ("62855577dd46c9dd7e7e8fab", "Swanson", "Baird", "swansonbaird@hinway.com", "+1 (802) 428-3754", false, "$2,014.62"),
    ("628555774195f8fd24b31c6f", "Bonnie", "Little", "bonnielittle@hinway.com", "+1 (981) 502-3955", true, "$1,596.06"),
    ("62855577c75a2bffe8099c63", "Browning", "Travis", "browningtravis@hinway.com", "+1 (877) 415-2490", false, "$3,306.06"),
    ("62855577b919c5002fe856a0", "Miles", "Bond", "milesbond@hinway.com", "+1 (822) 480-2450", true, "$2,028.84"),
    ("6285557721d7e6f8d5343a9d", "Collier", "Cardenas", "colliercardenas@hinway.com", "+1 (885) 525-3000", false, "$1,381.63"),
    ("6285557711c7ed18cf923d17", "Roslyn", "Owen", "roslynowen@hinway.com", "+1 (841) 468-3975", true, "$2,071.96"),
    ("6285557704966a5df4dfe23d", "Owens", "Burns", "owensburns@hinway.com", "+1 (955) 567-3607", false, "$3,503.04"),
    ("62855577ad64df82b2c481a0", "Candy", "Meyers", "candymeyers@hinway.com", "+1 (875) 445-2347", false, "$1,715.14"),
    ("62855577dbf6b90435ff2107", "Evans", "Peterson", "evanspeterson@hinway.com", "+1 (816) 484-3296", true, "$1,852.75"),
    ("628555771bdb1ab40ffe5d9f", "Marisol", "Griffin", "marisolgriffin@hinway.com", "+1 (817) 466-3255", false, "$3,627.11"),
    ("62855577af1aee8a772c90f0", "Guthrie", "Sanders", "guthriesanders@hinway.com", "+1 (878) 567-3847", true, "$1,889.68"),
    ("6285557774bcfb65bb51c001", "Pamela", "Davidson", "pameladavidson@hinway.com", "+1 (968) 406-2645", true, "$2,271.65"),
    ("62855577dbab16fb2e03dab6", "Lindsey", "Whitfield", "lindseywhitfield@hinway.com", "+1 (810) 429-3432", true, "$2,953.70"),
    ("62855577d812e7b34c7cf6e2", "Leola", "Ramsey", "leolaramsey@hinway.com", "+1 (842) 524-2799", true, "$1,033.86"),
    ("62855577fc3729572a693d79", "Stacy", "Mason", "stacymason@hinway.com", "+1 (887) 465-2768", false, "$2,611.62"),
    ("62855577bba9fd23f6878e63", "Dona", "Campos", "donacampos@hinway.com", "+1 (894) 598-2963", false, "$1,917.88"),
    ("62855577477bdbf14b55b5ad", "Anna", "Frederick", "annafrederick@hinway.com", "+1 (823) 409-3858", true, "$3,929.84"),
    ("62855577cc46f4b32485137f", "Maynard", "Howard", "maynardhoward@hinway.com", "+1 (951) 533-2249", true, "$1,323.58"),
    ("6285557743a8bdeb2aa5dc07", "Sonia", "Livingston", "sonialivingston@hinway.com", "+1 (957) 570-2414", false, "$1,174.11"),
    ("628555772a8b7b9926ffb917", "Wendy", "Lawson", "wendylawson@hinway.com", "+1 (907) 523-2723", false, "$1,582.33"),
    ("628555772a8b7b9926ffb918", "Wendy", "Lawson000", "wendylawson@hinway.com", "+1 (907) 523-2723", false, "$1,582.33"),
    ("628555772a8b7b9926ffb919", "Wendy", "Lawson000", "wendylawson@hinway2.com", "+1 (907) 523-2723", false, "$1,582.33"),
];

pub fn sample_users() -> Vec<NewUser> {
    SAMPLE_USERS
        .iter()
        .map(|&(id, first, last, email, phone, active, balance)| {
            NewUser::new(id)
                .first_name(first)
                .last_name(last)
                .email(email)
                .phone(phone)
                .active(active)
                .balance(balance)
        })
        .collect()
}

/// Record inserted with only an id and a first name; everything else defaulted.
pub fn sparse_user() -> NewUser {
    NewUser::new("628558706b92ac31676d779b").first_name("Mandy")
}

pub async fn seed<S: RecordStore>(index: &IndexCoordinator<S>) -> Vec<IndexedUser> {
    index.create_many(&sample_users()).await.unwrap()
}

pub fn ids(rows: &[IndexedUser]) -> Vec<&str> {
    rows.iter().map(|r| r.record.user_id.as_str()).collect()
}
