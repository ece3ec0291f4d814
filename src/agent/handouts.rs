// MEDIASCOUT Handout Presets — Curated Query Catalog
// Copyright (c) 2026 MediaScout_Dev | MEDIASCOUT
//
// The three SLP awareness handouts, each broken into sections with
// cartoon-oriented search queries and a per-section target. The catalog
// mirrors the printed handout structure so downloaded media lands in
// predictable per-handout folders.

/// One section of a handout: a theme with its query pool.
pub struct Section {
    pub name: &'static str,
    pub description: &'static str,
    pub queries: &'static [&'static str],
    pub target_quantity: usize,
}

/// A complete handout preset.
pub struct Handout {
    pub id: &'static str,
    pub title: &'static str,
    pub sections: &'static [Section],
}

pub const HANDOUTS: &[Handout] = &[
    Handout {
        id: "1_slp_info",
        title: "What is a Speech-Language Pathologist?",
        sections: &[
            Section {
                name: "Who Are We?",
                description: "SLPs with children - showing professional interaction",
                queries: &[
                    "speech pathologist working with children cartoon illustration",
                    "therapist helping child communicate fun playful illustration",
                    "professional women working with kids educational cartoon",
                    "diverse children learning with adult support cartoon",
                    "SLP speech therapy session cartoon illustration",
                ],
                target_quantity: 3,
            },
            Section {
                name: "How SLPs Help Children with Autism",
                description: "Learning and communication support",
                queries: &[
                    "child learning communication skills cartoon illustration",
                    "autism communication therapy playful cartoon",
                    "children developing language skills fun illustration",
                    "social communication learning cartoon diverse",
                    "speech development activities children cartoon",
                ],
                target_quantity: 3,
            },
            Section {
                name: "What Makes SLP Services Unique?",
                description: "Collaborative and family-centered care",
                queries: &[
                    "team collaboration healthcare professionals cartoon",
                    "family centered care parents children illustration",
                    "multidisciplinary team working together cartoon",
                    "therapist explaining to parents illustration",
                    "collaborative support network children cartoon",
                ],
                target_quantity: 2,
            },
            Section {
                name: "What to Expect from SLP Services",
                description: "Assessment and therapy process",
                queries: &[
                    "therapy assessment children cartoon illustration",
                    "speech therapist assessing child communication",
                    "progress monitoring therapy session cartoon",
                    "play-based learning therapy illustration",
                    "individualized treatment plan cartoon",
                ],
                target_quantity: 2,
            },
        ],
    },
    Handout {
        id: "2_communication",
        title: "10 Ways to Encourage Communication at Home",
        sections: &[
            Section {
                name: "Get Down to Their Level",
                description: "Eye-level interaction with children",
                queries: &[
                    "parent sitting on floor with child playing illustration",
                    "adult child eye level communication cartoon",
                    "family play interaction same level illustration",
                    "parent kneeling with child fun playful cartoon",
                    "caregiver engaged at child height illustration",
                ],
                target_quantity: 3,
            },
            Section {
                name: "Follow Your Child's Lead",
                description: "Play-based learning following interests",
                queries: &[
                    "child playing toys interested parent watching cartoon",
                    "parent following child play preferences illustration",
                    "kids engaged in favorite activity family cartoon",
                    "child-led play exploration illustration",
                    "interest-based learning playful cartoon",
                ],
                target_quantity: 3,
            },
            Section {
                name: "Celebrate ALL Communication",
                description: "Positive reinforcement for communication attempts",
                queries: &[
                    "celebrating child achievement happy family illustration",
                    "positive reinforcement praise child cartoon",
                    "parent encouraging child communication smile illustration",
                    "celebration success communication attempt cartoon",
                    "joy happiness family interaction illustration",
                ],
                target_quantity: 3,
            },
            Section {
                name: "Create Routines and Rituals",
                description: "Predictable family activities and routines",
                queries: &[
                    "family routine bedtime bath time illustration",
                    "predictable family ritual morning routine cartoon",
                    "daily family routine togetherness illustration",
                    "family tradition repeated activity cartoon",
                    "structured routine children comfort illustration",
                ],
                target_quantity: 2,
            },
        ],
    },
    Handout {
        id: "3_resources",
        title: "Ontario Resources for Families",
        sections: &[
            Section {
                name: "Government-Funded Programs",
                description: "Community services and public programs",
                queries: &[
                    "community resources support services illustration",
                    "government health program family support cartoon",
                    "healthcare access children services illustration",
                    "public program accessibility diverse families cartoon",
                    "community care support system illustration",
                ],
                target_quantity: 2,
            },
            Section {
                name: "Autism Organizations",
                description: "Support groups and advocacy organizations",
                queries: &[
                    "autism support community network illustration",
                    "advocacy organization helping families cartoon",
                    "support group people coming together illustration",
                    "community organization connection cartoon",
                    "autism awareness group illustration",
                ],
                target_quantity: 2,
            },
            Section {
                name: "Parent Training Programs",
                description: "Workshops and educational programs",
                queries: &[
                    "parent training workshop education illustration",
                    "family learning program teaching cartoon",
                    "educational workshop participants illustration",
                    "learning opportunity parent child illustration",
                    "professional training parent support cartoon",
                ],
                target_quantity: 2,
            },
            Section {
                name: "Support Groups & Community",
                description: "Family connections and community support",
                queries: &[
                    "support group community connection illustration",
                    "family together supportive community cartoon",
                    "people supporting each other illustration",
                    "community care network family illustration",
                    "friends supporting friends cartoon",
                ],
                target_quantity: 2,
            },
        ],
    },
];

/// Look a handout up by full id ("1_slp_info") or bare number ("1").
pub fn find_handout(id: &str) -> Option<&'static Handout> {
    HANDOUTS
        .iter()
        .find(|h| h.id == id || h.id.starts_with(&format!("{}_", id)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        assert_eq!(HANDOUTS.len(), 3);
        for handout in HANDOUTS {
            assert!(!handout.sections.is_empty());
            for section in handout.sections {
                assert_eq!(section.queries.len(), 5);
                assert!(section.target_quantity > 0);
            }
        }
    }

    #[test]
    fn test_find_by_bare_number() {
        let handout = find_handout("1").unwrap();
        assert_eq!(handout.id, "1_slp_info");
    }

    #[test]
    fn test_find_by_full_id() {
        let handout = find_handout("3_resources").unwrap();
        assert_eq!(handout.title, "Ontario Resources for Families");
    }

    #[test]
    fn test_find_unknown_is_none() {
        assert!(find_handout("9").is_none());
        assert!(find_handout("").is_none());
    }
}
