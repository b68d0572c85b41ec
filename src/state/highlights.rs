use crate::data::format::{format_diff, format_number, Cell, Raw, PLACEHOLDER};
use crate::data::loader::Record;

/// One summary tile at the top of the overview page.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub title: &'static str,
    pub value: Cell,
}

/// Headline figures taken from the newest daily record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Highlights {
    pub tiles: Vec<Tile>,
}

impl Highlights {
    /// `daily` is oldest first. An empty table yields no tiles.
    pub fn from_daily(daily: &[Record]) -> Self {
        let Some(latest) = daily.last() else {
            return Self::default();
        };

        let total = Raw::from(latest.get("total")).to_number();
        let average = if total.is_finite() {
            total / daily.len() as f64
        } else {
            f64::NAN
        };
        let rank_change = match format_diff(latest.get("rank_cng"), 0) {
            Some(diff) => Cell::Diff(diff),
            None => Cell::Text(PLACEHOLDER.to_string()),
        };

        let text = |s: String| Cell::Text(s);
        Self {
            tiles: vec![
                Tile { title: "Total Points", value: text(format_number(total, 0)) },
                Tile { title: "Average / Day", value: text(format_number(average, 1)) },
                Tile { title: "World Rank", value: text(format_number(latest.get("rank"), 0)) },
                Tile {
                    title: "Country Rank",
                    value: text(format_number(latest.get("country_rank"), 0)),
                },
                Tile { title: "Rank Change", value: rank_change },
            ],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::format::Trend;
    use crate::data::loader::{parse_records, RowMode, TableSet};

    fn tile<'a>(h: &'a Highlights, title: &str) -> &'a Cell {
        &h.tiles.iter().find(|t| t.title == title).unwrap().value
    }

    fn daily(text: &str) -> Vec<Record> {
        let tables = TableSet::builtin().unwrap();
        parse_records(text, &tables.daily, RowMode::Lenient)
    }

    #[test]
    fn tiles_come_from_the_latest_record() {
        let rows = daily(
            "2024-01-01 1000 1000 500 0 1 0 20 0\n\
             2024-01-02 2500 1500 480 -20 1 0 18 -2\n",
        );
        let h = Highlights::from_daily(&rows);

        assert_eq!(tile(&h, "Total Points").text(), "2,500");
        assert_eq!(tile(&h, "Average / Day").text(), "1,250.0");
        assert_eq!(tile(&h, "World Rank").text(), "480");
        assert_eq!(tile(&h, "Country Rank").text(), "18");

        let change = tile(&h, "Rank Change");
        assert_eq!(change.trend(), Some(Trend::Down));
        assert_eq!(change.text(), "-20");
    }

    #[test]
    fn missing_fields_render_placeholders() {
        let rows = daily("2024-01-01 10\n");
        let h = Highlights::from_daily(&rows);
        assert_eq!(tile(&h, "World Rank").text(), PLACEHOLDER);
        assert_eq!(tile(&h, "Rank Change").text(), PLACEHOLDER);
        assert_eq!(tile(&h, "Rank Change").trend(), None);
    }

    #[test]
    fn empty_table_has_no_tiles() {
        assert!(Highlights::from_daily(&[]).is_empty());
    }
}
