use super::super::domain::Instrument;
use super::super::scoring::InstrumentScores;
use chrono::NaiveDateTime;

pub const REPORT_TITLE: &str = "Psychometric Report";
pub const TIMESTAMP_FORMAT: &str = "generated on %d/%m/%Y %H:%M";
pub const CHART_CAPTION: &str = "Ego-state chart:";
pub const CHART_WIDTH_CM: f32 = 15.0;
pub const CHART_HEIGHT_CM: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Normal,
    Heading,
    Italic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Two-column dimension/score table in catalog order.
    pub fn scores(scores: &InstrumentScores) -> Self {
        Self {
            header: vec!["Dimension".to_string(), "Score".to_string()],
            rows: scores
                .dimensions()
                .iter()
                .map(|dimension| vec![dimension.name.to_string(), dimension.score.to_string()])
                .collect(),
        }
    }

    pub fn columns(&self) -> usize {
        self.header.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock {
    pub png: Vec<u8>,
    pub width_cm: f32,
    pub height_cm: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text { style: TextStyle, text: String },
    Table(Table),
    Image(ImageBlock),
    Spacer { height_cm: f32 },
}

impl Block {
    fn text(style: TextStyle, text: impl Into<String>) -> Self {
        Self::Text {
            style,
            text: text.into(),
        }
    }

    fn spacer(height_cm: f32) -> Self {
        Self::Spacer { height_cm }
    }
}

/// Ordered content of one export, before serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    blocks: Vec<Block>,
}

impl ReportDocument {
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn section_headings(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Text {
                style: TextStyle::Heading,
                text,
            } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageBlock> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Image(image) => Some(image),
            _ => None,
        })
    }
}

/// Lays out the three instrument sections; only the ego-state section carries a chart.
pub fn assemble(
    ego_state: &InstrumentScores,
    trait_role: &InstrumentScores,
    situational_role: &InstrumentScores,
    ego_state_chart: &[u8],
    generated_at: NaiveDateTime,
) -> ReportDocument {
    let blocks = vec![
        Block::text(TextStyle::Title, REPORT_TITLE),
        Block::text(
            TextStyle::Normal,
            generated_at.format(TIMESTAMP_FORMAT).to_string(),
        ),
        Block::spacer(0.5),
        Block::text(TextStyle::Heading, Instrument::EgoState.section_title()),
        Block::Table(Table::scores(ego_state)),
        Block::spacer(0.3),
        Block::text(TextStyle::Italic, CHART_CAPTION),
        Block::Image(ImageBlock {
            png: ego_state_chart.to_vec(),
            width_cm: CHART_WIDTH_CM,
            height_cm: CHART_HEIGHT_CM,
        }),
        Block::spacer(0.5),
        Block::text(TextStyle::Heading, Instrument::TraitRole.section_title()),
        Block::Table(Table::scores(trait_role)),
        Block::spacer(0.5),
        Block::text(TextStyle::Heading, Instrument::SituationalRole.section_title()),
        Block::Table(Table::scores(situational_role)),
    ];

    ReportDocument { blocks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{compute_all_scores, RatingSheet};
    use chrono::NaiveDate;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 7)
            .and_then(|date| date.and_hms_opt(14, 5, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn document_has_three_sections_and_one_image() {
        let scores = compute_all_scores(&RatingSheet::with_defaults()).expect("scores");
        let document = assemble(
            &scores.ego_state,
            &scores.trait_role,
            &scores.situational_role,
            b"png",
            generated_at(),
        );

        let headings: Vec<_> = document.section_headings().collect();
        assert_eq!(
            headings,
            [
                "1) Ego-state profile",
                "2) Trait-role profile (traditional)",
                "3) Situational-role profile"
            ]
        );
        assert_eq!(document.images().count(), 1);
    }

    #[test]
    fn timestamp_uses_day_first_format() {
        let scores = compute_all_scores(&RatingSheet::with_defaults()).expect("scores");
        let document = assemble(
            &scores.ego_state,
            &scores.trait_role,
            &scores.situational_role,
            b"png",
            generated_at(),
        );

        assert_eq!(
            document.blocks()[1],
            Block::Text {
                style: TextStyle::Normal,
                text: "generated on 07/03/2025 14:05".to_string(),
            }
        );
    }

    #[test]
    fn score_tables_list_dimensions_in_catalog_order() {
        let scores = compute_all_scores(&RatingSheet::with_defaults()).expect("scores");
        let table = Table::scores(&scores.trait_role);
        assert_eq!(table.columns(), 2);
        assert_eq!(table.header, ["Dimension", "Score"]);
        assert_eq!(
            table.rows,
            [["Victim", "9"], ["Rescuer", "9"], ["Persecutor", "9"]]
        );
    }
}
