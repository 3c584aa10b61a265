use crate::stats;
use crate::unit::ProblemUnit;

const DEFAULT_SUMMARY_TARGETS: [f64; 6] = [1e3, 10.0, 0.1, 1e-3, 1e-5, 1e-8];

impl ProblemUnit {
    /// Text table of run-length percentiles, ERT and successes per target,
    /// all evaluation counts divided by the dimension.
    pub fn summary(&self, targets: Option<&[f64]>) -> String {
        let hardest = self.target.last().copied().unwrap_or(f64::NAN);
        let mut targets: Vec<f64> = match targets {
            Some(t) if !t.is_empty() => t.to_vec(),
            _ => {
                let mut t = DEFAULT_SUMMARY_TARGETS.to_vec();
                if hardest < 1e-8 {
                    t.push(hardest);
                }
                t
            }
        };
        if let Some(last) = targets.last_mut() {
            if *last < hardest {
                *last = hardest;
            }
        }
        targets.sort_by(|a, b| stats::cmp_nan_last(b, a));
        targets.dedup();

        let dim = f64::from(self.dimension().max(1));
        let min_budget = self.maxevals.iter().copied().fold(f64::INFINITY, f64::min);

        let mut out = format!(
            "Algorithm: {}\nFunction ID: {}\nDimension DIM = {}\nNumber of trials: {}\n",
            self.algorithm_id(),
            self.function_id(),
            self.dimension(),
            self.nb_runs()
        );
        if let (false, Some(precision)) = (self.is_biobjective(), self.header.precision) {
            out.push_str(&format!("Final target Df: {:e}\n", precision));
        }
        out.push_str(&format!(
            "min / max number of evals per trial: {} / {}\n",
            min_budget as i64,
            self.max_eval() as i64
        ));
        out.push_str("   evals/DIM:  best     15%     50%     85%     max |  aRT/DIM  nsucc\n");
        out.push_str("  ---Df---|-----------------------------------------|----------------");

        let evals = self.det_evals(&targets);
        let successes = self.det_successes(&targets);
        let ert = self.det_ert(&targets);
        for (i, &target) in targets.iter().enumerate() {
            let mut line = format!("  {:.1e} |", target);
            for value in stats::prctile(&evals[i], &[0.0, 15.0, 50.0, 85.0, 100.0], true) {
                if value.is_nan() {
                    line.push_str("     .  ");
                } else {
                    line.push_str(&format!(" {:7}", (value / dim).round() as i64));
                }
            }
            if ert[i].is_finite() {
                line.push_str(&format!(" |{:9.1}", ert[i] / dim));
            } else {
                line.push_str(" |    nan  ");
            }
            line.push_str(&format!("  {:2}", successes[i]));
            out.push('\n');
            out.push_str(&line);
            if target < hardest {
                break;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::unit::tests::sample_unit;

    #[test]
    fn summary_lists_requested_targets() {
        let unit = sample_unit();
        let text = unit.summary(Some(&[1e-1, 1e-3]));
        assert!(text.contains("Algorithm: BFGS"));
        assert!(text.contains("Number of trials: 3"));
        let rows: Vec<&str> = text.lines().skip(7).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("  1.0e-1 |"));
        assert!(rows[1].trim_end().ends_with(" 2"));
    }

    #[test]
    fn summary_header_reports_precision_and_budgets() {
        let mut unit = sample_unit();
        unit.header_mut().precision = Some(1e-8);
        let text = unit.summary(Some(&[1e-1]));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Algorithm: BFGS");
        assert_eq!(lines[1], "Function ID: 2");
        assert_eq!(lines[2], "Dimension DIM = 10");
        assert_eq!(lines[4], "Final target Df: 1e-8");
        assert_eq!(lines[5], "min / max number of evals per trial: 100 / 100");
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn default_summary_stops_below_hardest_target() {
        let unit = sample_unit();
        let text = unit.summary(None);
        // 1e3, 10, 0.1, 1e-3, then 1e-5 replaces 1e-8 as the last target
        assert_eq!(text.lines().skip(7).count(), 5);
        // ERT of 290 evaluations at 1e-5 in 10-D
        assert!(text.lines().last().unwrap().contains("29.0"));
    }
}
