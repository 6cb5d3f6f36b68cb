//! Company fixtures with hand-picked embeddings.

use std::sync::Arc;

use bizmatch::embedding::{EmbeddingAccessor, MockEmbedder};
use bizmatch::ranking::RankingEngine;
use bizmatch::store::CompanyRecord;

pub const DIM: usize = 3;

/// Unit vectors along each axis, plus a diagonal.
pub const ROBOTICS: [f32; DIM] = [1.0, 0.0, 0.0];
pub const FOOD: [f32; DIM] = [0.0, 1.0, 0.0];
pub const FINANCE: [f32; DIM] = [0.0, 0.0, 1.0];
pub const MIXED: [f32; DIM] = [0.577_350_3, 0.577_350_3, 0.577_350_3];

pub struct CompanyBuilder {
    record: CompanyRecord,
}

impl CompanyBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            record: CompanyRecord::new(name, format!("{name} profile")),
        }
    }

    pub fn profile(mut self, text: &str) -> Self {
        self.record.profile_text = Some(text.to_string());
        self
    }

    pub fn vector(mut self, vector: [f32; DIM]) -> Self {
        self.record.embedding = Some(vector.to_vec());
        self
    }

    pub fn no_vector(mut self) -> Self {
        self.record.embedding = None;
        self
    }

    pub fn keywords(mut self, keywords: &[&str]) -> Self {
        self.record = self.record.with_keywords(keywords.iter().copied());
        self
    }

    pub fn gives(mut self) -> Self {
        self.record.gives = true;
        self
    }

    pub fn top10(mut self) -> Self {
        self.record.top10_customers = true;
        self
    }

    pub fn aux(mut self, key: &str, value: serde_json::Value) -> Self {
        self.record.auxiliary.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> CompanyRecord {
        self.record
    }
}

/// Mock embedder mapping the sector profile texts onto the fixture axes.
pub fn sector_embedder() -> Arc<MockEmbedder> {
    Arc::new(
        MockEmbedder::new(DIM)
            .with_vector("robots and automation", ROBOTICS.to_vec())
            .with_vector("bakery and catering", FOOD.to_vec())
            .with_vector("banking and insurance", FINANCE.to_vec())
            .with_vector("a bit of everything", MIXED.to_vec()),
    )
}

pub fn engine_with(embedder: Arc<MockEmbedder>) -> Arc<RankingEngine> {
    Arc::new(RankingEngine::new(Arc::new(EmbeddingAccessor::new(
        embedder,
    ))))
}

/// Seven companies across three sectors.
pub fn sample_companies() -> Vec<CompanyRecord> {
    vec![
        CompanyBuilder::new("RoboCo")
            .vector(ROBOTICS)
            .keywords(&["automation", "robots"])
            .gives()
            .build(),
        CompanyBuilder::new("ArmWorks")
            .vector([0.9, 0.1, 0.0])
            .keywords(&["robots"])
            .build(),
        CompanyBuilder::new("Crumbs")
            .vector(FOOD)
            .keywords(&["bread"])
            .top10()
            .build(),
        CompanyBuilder::new("Catering Co")
            .vector([0.1, 0.9, 0.0])
            .keywords(&["events"])
            .build(),
        CompanyBuilder::new("FirstBank")
            .vector(FINANCE)
            .keywords(&["loans"])
            .gives()
            .top10()
            .build(),
        CompanyBuilder::new("Insure Inc")
            .vector([0.0, 0.1, 0.9])
            .keywords(&["insurance"])
            .build(),
        CompanyBuilder::new("Generalist")
            .vector(MIXED)
            .keywords(&["automation", "bread", "loans"])
            .build(),
    ]
}
