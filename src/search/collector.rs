//! Full match set collection

use tantivy::collector::{Collector, SegmentCollector};
use tantivy::{DocAddress, DocId, Score, SegmentOrdinal, SegmentReader};

/// Collects every matching `(score, address)` pair, not just a top-k page.
///
/// Aggregate facet counting needs the complete match set; this is the main
/// cost driver of the counting path.
pub(crate) struct MatchSetCollector;

impl Collector for MatchSetCollector {
    type Fruit = Vec<(Score, DocAddress)>;
    type Child = MatchSetSegmentCollector;

    fn for_segment(
        &self,
        segment_local_id: SegmentOrdinal,
        _segment: &SegmentReader,
    ) -> tantivy::Result<Self::Child> {
        Ok(MatchSetSegmentCollector {
            segment_ord: segment_local_id,
            hits: Vec::new(),
        })
    }

    fn requires_scoring(&self) -> bool {
        true
    }

    fn merge_fruits(&self, segment_fruits: Vec<Self::Fruit>) -> tantivy::Result<Self::Fruit> {
        Ok(segment_fruits.into_iter().flatten().collect())
    }
}

pub(crate) struct MatchSetSegmentCollector {
    segment_ord: SegmentOrdinal,
    hits: Vec<(Score, DocAddress)>,
}

impl SegmentCollector for MatchSetSegmentCollector {
    type Fruit = Vec<(Score, DocAddress)>;

    fn collect(&mut self, doc: DocId, score: Score) {
        self.hits.push((score, DocAddress::new(self.segment_ord, doc)));
    }

    fn harvest(self) -> Self::Fruit {
        self.hits
    }
}
