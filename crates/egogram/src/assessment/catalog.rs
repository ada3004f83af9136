use super::domain::{Instrument, StatementId, STATEMENTS_PER_DIMENSION};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub statements: [&'static str; STATEMENTS_PER_DIMENSION],
}

static EGO_STATE: [DimensionTemplate; 5] = [
    DimensionTemplate {
        key: "critical_parent",
        name: "Critical Parent",
        statements: [
            "I tend to correct others when I think they are wrong.",
            "I am demanding of myself and of others.",
            "I have well-defined rules about what is right and wrong.",
        ],
    },
    DimensionTemplate {
        key: "nurturing_parent",
        name: "Nurturing Parent",
        statements: [
            "I like taking care of the people around me.",
            "I usually listen to and support those in need.",
            "I care about the well-being of others.",
        ],
    },
    DimensionTemplate {
        key: "adult",
        name: "Adult",
        statements: [
            "I make decisions based on facts and logic.",
            "I can stay calm even in difficult situations.",
            "I think things through carefully before acting.",
        ],
    },
    DimensionTemplate {
        key: "free_child",
        name: "Free Child",
        statements: [
            "I like to have fun without worrying about being judged.",
            "I am creative and spontaneous.",
            "I express my emotions freely.",
        ],
    },
    DimensionTemplate {
        key: "adapted_child",
        name: "Adapted Child",
        statements: [
            "I usually follow the rules to avoid trouble.",
            "I worry about what others think of me.",
            "Sometimes I feel insecure about expressing my opinions.",
        ],
    },
];

static TRAIT_ROLE: [DimensionTemplate; 3] = [
    DimensionTemplate {
        key: "victim",
        name: "Victim",
        statements: [
            "I feel that people do not understand me.",
            "I often feel treated unfairly.",
            "I find it hard to act on my own in certain situations.",
        ],
    },
    DimensionTemplate {
        key: "rescuer",
        name: "Rescuer",
        statements: [
            "I tend to help even when nobody asked me to.",
            "I feel I must solve other people's problems.",
            "I worry excessively about the well-being of others.",
        ],
    },
    DimensionTemplate {
        key: "persecutor",
        name: "Persecutor",
        statements: [
            "I tend to criticize people who do not act as I expect.",
            "I think certain people deserve to be reprimanded.",
            "I get irritated easily when something is wrong.",
        ],
    },
];

static SITUATIONAL_ROLE: [DimensionTemplate; 3] = [
    DimensionTemplate {
        key: "victim",
        name: "Victim",
        statements: [
            "Do you prefer to wait for someone to solve things for you instead of asking for help directly?",
            "Do you feel wronged when criticized and think 'nobody understands me'?",
            "When something goes wrong beyond your control, do you think 'this always happens to me'?",
        ],
    },
    DimensionTemplate {
        key: "rescuer",
        name: "Rescuer",
        statements: [
            "Do you help a stressed person without being asked, even while busy yourself?",
            "Do you solve other people's problems to feel useful, even if it overloads you?",
            "Do you think of solutions before even asking whether they want your help?",
        ],
    },
    DimensionTemplate {
        key: "persecutor",
        name: "Persecutor",
        statements: [
            "Do you point out other people's mistakes immediately and expect them to change?",
            "Have you ever criticized someone by saying 'you always do this wrong'?",
            "Do you feel the urge to correct other people's flaws, even without being asked?",
        ],
    },
];

impl Instrument {
    /// Dimensions in catalog order. The order drives scoring, charts and report tables.
    pub fn dimensions(self) -> &'static [DimensionTemplate] {
        match self {
            Self::EgoState => &EGO_STATE,
            Self::TraitRole => &TRAIT_ROLE,
            Self::SituationalRole => &SITUATIONAL_ROLE,
        }
    }

    pub fn dimension(self, position: usize) -> Option<&'static DimensionTemplate> {
        self.dimensions().get(position)
    }

    pub fn dimension_by_key(self, key: &str) -> Option<(usize, &'static DimensionTemplate)> {
        self.dimensions()
            .iter()
            .enumerate()
            .find(|(_, dimension)| dimension.key.eq_ignore_ascii_case(key.trim()))
    }

    /// Every statement of the instrument, dimension by dimension.
    pub fn statement_ids(self) -> impl Iterator<Item = StatementId> {
        self.dimensions()
            .iter()
            .enumerate()
            .flat_map(move |(dimension, template)| {
                (0..template.statements.len())
                    .map(move |index| StatementId::new(self, dimension, index))
            })
    }
}

impl StatementId {
    pub fn template(&self) -> Option<&'static DimensionTemplate> {
        self.instrument.dimension(self.dimension)
    }

    pub fn text(&self) -> Option<&'static str> {
        self.template()
            .and_then(|template| template.statements.get(self.index).copied())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub instruments: Vec<InstrumentCatalogView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstrumentCatalogView {
    pub instrument: Instrument,
    pub label: &'static str,
    pub rating_scale: [u8; 2],
    pub default_rating: u8,
    pub dimensions: Vec<DimensionCatalogView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionCatalogView {
    pub key: &'static str,
    pub name: &'static str,
    pub statements: Vec<&'static str>,
}

/// Read-only listing of every instrument for clients building a questionnaire form.
pub fn catalog_view() -> CatalogView {
    let instruments = Instrument::ordered()
        .into_iter()
        .map(|instrument| InstrumentCatalogView {
            instrument,
            label: instrument.label(),
            rating_scale: [super::Rating::MIN, super::Rating::MAX],
            default_rating: super::Rating::DEFAULT.value(),
            dimensions: instrument
                .dimensions()
                .iter()
                .map(|dimension| DimensionCatalogView {
                    key: dimension.key,
                    name: dimension.name,
                    statements: dimension.statements.to_vec(),
                })
                .collect(),
        })
        .collect();

    CatalogView { instruments }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn instruments_have_fixed_dimension_counts() {
        assert_eq!(Instrument::EgoState.dimensions().len(), 5);
        assert_eq!(Instrument::TraitRole.dimensions().len(), 3);
        assert_eq!(Instrument::SituationalRole.dimensions().len(), 3);
    }

    #[test]
    fn dimension_names_and_keys_are_unique_per_instrument() {
        for instrument in Instrument::ordered() {
            let names: HashSet<_> = instrument.dimensions().iter().map(|d| d.name).collect();
            let keys: HashSet<_> = instrument.dimensions().iter().map(|d| d.key).collect();
            assert_eq!(names.len(), instrument.dimensions().len(), "{instrument}");
            assert_eq!(keys.len(), instrument.dimensions().len(), "{instrument}");
        }
    }

    #[test]
    fn ego_state_dimensions_follow_catalog_order() {
        let names: Vec<_> = Instrument::EgoState
            .dimensions()
            .iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(
            names,
            [
                "Critical Parent",
                "Nurturing Parent",
                "Adult",
                "Free Child",
                "Adapted Child"
            ]
        );
    }

    #[test]
    fn statement_ids_cover_every_statement_once() {
        let ids: Vec<_> = Instrument::TraitRole.statement_ids().collect();
        assert_eq!(ids.len(), 9);
        assert_eq!(ids[0], StatementId::new(Instrument::TraitRole, 0, 0));
        assert_eq!(ids[8], StatementId::new(Instrument::TraitRole, 2, 2));
        assert!(ids.iter().all(|id| id.text().is_some()));
    }

    #[test]
    fn roles_share_names_but_not_statements_across_instruments() {
        let (trait_pos, trait_victim) = Instrument::TraitRole
            .dimension_by_key("victim")
            .expect("trait victim");
        let (sit_pos, sit_victim) = Instrument::SituationalRole
            .dimension_by_key("VICTIM")
            .expect("situational victim");
        assert_eq!(trait_pos, sit_pos);
        assert_eq!(trait_victim.name, sit_victim.name);
        assert_ne!(trait_victim.statements, sit_victim.statements);
    }

    #[test]
    fn catalog_view_lists_all_instruments() {
        let view = catalog_view();
        assert_eq!(view.instruments.len(), 3);
        assert_eq!(view.instruments[0].rating_scale, [1, 5]);
        assert_eq!(view.instruments[0].default_rating, 3);
        assert_eq!(view.instruments[2].dimensions[1].statements.len(), 3);
    }
}
