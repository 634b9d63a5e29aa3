//! Bootstrap personas created when the record store holds none.

use crate::types::PersonaConfig;
use std::collections::HashMap;

/// The fixed bootstrap set: one persona per operating role.
pub fn default_personas() -> Vec<PersonaConfig> {
    vec![
        PersonaConfig {
            name: "Vera Strand".into(),
            role: "executive".into(),
            personality_traits: HashMap::from([
                ("leadership".to_string(), 9.0),
                ("decisiveness".to_string(), 8.0),
                ("strategic_thinking".to_string(), 9.0),
            ]),
            communication_style: "authoritative_yet_approachable".into(),
            expertise_areas: vec![
                "governance".into(),
                "strategy".into(),
                "dao_operations".into(),
                "public_speaking".into(),
            ],
            authority_level: 9,
            social_accounts: HashMap::from([("twitter".to_string(), "@VeraStrandExec".to_string())]),
            contact_info: HashMap::new(),
        },
        PersonaConfig {
            name: "Malik Osei".into(),
            role: "technical".into(),
            personality_traits: HashMap::from([
                ("analytical".to_string(), 9.0),
                ("precision".to_string(), 9.0),
                ("innovation".to_string(), 8.0),
            ]),
            communication_style: "technical_but_clear".into(),
            expertise_areas: vec![
                "blockchain".into(),
                "smart_contracts".into(),
                "mining".into(),
                "security".into(),
            ],
            authority_level: 8,
            social_accounts: HashMap::from([("github".to_string(), "malik-osei-dev".to_string())]),
            contact_info: HashMap::new(),
        },
        PersonaConfig {
            name: "June Park".into(),
            role: "community".into(),
            personality_traits: HashMap::from([
                ("empathy".to_string(), 9.0),
                ("enthusiasm".to_string(), 8.0),
                ("creativity".to_string(), 8.0),
            ]),
            communication_style: "warm_and_engaging".into(),
            expertise_areas: vec![
                "community_building".into(),
                "social_media".into(),
                "events".into(),
                "education".into(),
            ],
            authority_level: 8,
            social_accounts: HashMap::from([("twitter".to_string(), "@JuneParkComm".to_string())]),
            contact_info: HashMap::new(),
        },
        PersonaConfig {
            name: "Henrik Dahl".into(),
            role: "compliance".into(),
            personality_traits: HashMap::from([
                ("attention_to_detail".to_string(), 9.0),
                ("cautiousness".to_string(), 8.0),
                ("thoroughness".to_string(), 9.0),
            ]),
            communication_style: "precise_and_formal".into(),
            expertise_areas: vec![
                "regulatory_compliance".into(),
                "legal_analysis".into(),
                "risk_assessment".into(),
            ],
            authority_level: 8,
            social_accounts: HashMap::new(),
            contact_info: HashMap::new(),
        },
    ]
}
