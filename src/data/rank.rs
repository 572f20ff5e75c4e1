use super::model::CellRecord;

/// Where one cell's resistances sit within the tested batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRank {
    pub id: i64,
    pub st: f64,
    pub lt: f64,
    /// 1 = lowest `st`. Equal values share the lowest rank.
    pub st_rank: usize,
    pub lt_rank: usize,
    pub tested: usize,
}

impl CellRank {
    pub fn st_percentile(&self) -> f64 {
        self.st_rank as f64 / self.tested as f64 * 100.0
    }

    pub fn lt_percentile(&self) -> f64 {
        self.lt_rank as f64 / self.tested as f64 * 100.0
    }

    /// Three-line resistance / rank / percentile table.
    pub fn render(&self) -> String {
        let st_rank = format!("{} of {}", self.st_rank, self.tested);
        let lt_rank = format!("{} of {}", self.lt_rank, self.tested);
        let st_pct = format!("{:.0}%", self.st_percentile());
        let lt_pct = format!("{:.0}%", self.lt_percentile());
        format!(
            "Cell {}\n\
             Resistance: {:<16.3e} {:.3e}\n\
             Rank:       {:<16} {}\n\
             Percentile: {:<16} {}\n",
            self.id,
            self.st,
            self.lt,
            st_rank,
            lt_rank,
            st_pct,
            lt_pct,
        )
    }
}

/// Rank `id` among `cells`. `None` if the id was not tested.
pub fn rank_cell(cells: &[CellRecord], id: i64) -> Option<CellRank> {
    let target = cells.iter().find(|c| c.id == id)?;
    let rank_of = |value: fn(&CellRecord) -> f64| {
        let own = value(target);
        1 + cells.iter().filter(|&c| value(c) < own).count()
    };

    Some(CellRank {
        id,
        st: target.st,
        lt: target.lt,
        st_rank: rank_of(|c| c.st),
        lt_rank: rank_of(|c| c.lt),
        tested: cells.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: i64, st: f64, lt: f64) -> CellRecord {
        CellRecord { id, v0: 3.6, st, lt }
    }

    #[test]
    fn ranks_and_percentiles() {
        let cells = [
            rec(1, 0.03, 0.010),
            rec(2, 0.01, 0.030),
            rec(3, 0.02, 0.020),
            rec(4, 0.02, 0.040),
        ];
        let r = rank_cell(&cells, 3).unwrap();
        assert_eq!(r.st_rank, 2);
        assert_eq!(r.lt_rank, 2);
        assert_eq!(r.tested, 4);
        assert_eq!(r.st_percentile(), 50.0);

        // tie on st with cell 3 shares rank 2
        assert_eq!(rank_cell(&cells, 4).unwrap().st_rank, 2);
        assert_eq!(rank_cell(&cells, 1).unwrap().st_rank, 4);
    }

    #[test]
    fn unknown_cell() {
        assert!(rank_cell(&[rec(1, 0.01, 0.01)], 2).is_none());
    }

    #[test]
    fn render_has_three_rows() {
        let r = rank_cell(&[rec(1, 0.01, 0.02), rec(2, 0.02, 0.01)], 2).unwrap();
        let text = r.render();
        assert!(text.contains("Rank:       2 of 2"));
        assert!(text.contains("Percentile: 100%"));
        assert!(text.contains("50%"));
    }
}
