use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::models::{DeviceType, GeneralUser};

const FIRST_NAMES: &[&str] = &[
    "Aarav", "Vivaan", "Aditya", "Ishaan", "Kabir", "Ananya", "Diya", "Meera", "Saanvi", "Riya",
];
const LAST_NAMES: &[&str] = &[
    "Shah", "Patel", "Mehta", "Iyer", "Reddy", "Kapoor", "Joshi", "Desai", "Nair", "Gupta",
];

/// Produces a complete profile for sites that let users in without
/// registration data.
pub trait ProfileSynthesizer: Send + Sync {
    fn synthesize(&self) -> GeneralUser;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomProfileSynthesizer;

impl ProfileSynthesizer for RandomProfileSynthesizer {
    fn synthesize(&self) -> GeneralUser {
        let mut rng = rand::thread_rng();
        let first_name = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Auto");
        let last_name = LAST_NAMES.choose(&mut rng).copied().unwrap_or("User");

        GeneralUser {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            firm_name: format!("{}{}", first_name.to_lowercase(), rng.gen_range(100..1000)),
            contact_number: format!("{}{:09}", rng.gen_range(6..10), rng.gen_range(0..1_000_000_000u32)),
            gst_number: format!("{}AAAAA{}A1ZA", rng.gen_range(10..99), rng.gen_range(1000..9999)),
            os: "AUTO".to_string(),
            device_id: Uuid::new_v4().simple().to_string(),
            device_type: Some(DeviceType::Ios),
            random_pass: String::new(),
            is_auto: true,
            registration_incomplete: false,
        }
    }
}
