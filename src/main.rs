// FibSlicer: Rule-level equivalence classes of forwarding tables
// Copyright (C) 2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

use std::path::PathBuf;

use clap::Parser;
use fib_slicer::{emitter::FIRST_SLICE_ID, filter::DEFAULT_MIN_LEN, prelude::*, snapshot};
use itertools::Itertools;

const DELIMITER: &str =
    "==============================================================================";

/// Compute the equivalence classes of all switches in a network snapshot.
#[derive(Debug, Parser)]
struct Cli {
    /// JSON file containing the snapshot of all switches (a list of switches, each with its
    /// interfaces and rules).
    #[clap(short, long)]
    input: PathBuf,
    /// Only emit equivalence classes whose path has at least this many switches.
    #[clap(short, long, default_value_t = DEFAULT_MIN_LEN)]
    min_length: usize,
    /// Number of workers to use in parallel. If not specified, it will use all available workers.
    #[clap(short, long)]
    threads: Option<usize>,
    /// Report inconsistencies in the snapshot.
    #[clap(long)]
    show_warnings: bool,
    /// Report next hops that do not belong to any interface.
    #[clap(long)]
    show_unknown_next_hops: bool,
    /// Report rules that reach multiple rules on the next switch.
    #[clap(long)]
    show_multiple_next_hops: bool,
    /// Report forwarding loops.
    #[clap(long)]
    show_forwarding_loops: bool,
    /// Enable all reports.
    #[clap(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> AnalyzerConfig {
        if self.verbose {
            AnalyzerConfig::verbose()
        } else {
            AnalyzerConfig {
                show_warnings: self.show_warnings,
                show_unknown_next_hops: self.show_unknown_next_hops,
                show_multiple_next_hops: self.show_multiple_next_hops,
                show_forwarding_loops: self.show_forwarding_loops,
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_timed();

    let args = Cli::parse();
    let config = args.config();

    let threads = args.threads.unwrap_or_else(num_cpus::get);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()?;

    let net = Network::from_snapshots(snapshot::load_json(&args.input)?, &config)?;

    println!("{:>15}{:>12}{:>12}", "Name", "interfaces", "rules");
    for switch in net.switches().iter().sorted_by(|a, b| a.name().cmp(b.name())) {
        println!(
            "{:>15}{:>12}{:>12}",
            switch.name(),
            switch.interfaces().len(),
            switch.num_rules()
        );
    }
    println!("{DELIMITER}");

    let graph = RuleGraph::build(&net, &config);
    println!("{graph}");
    println!("{DELIMITER}");

    let results = analyze_all(&net, &graph, &config);
    let mut emitter = SummaryEmitter::new(
        &net,
        FilterChain::new().with(MinLengthFilter::new(args.min_length)),
        FIRST_SLICE_ID,
    );

    println!(
        "{:>15}{:>12}{:>14}{:>12}{:>12}",
        "Name", "used rules", "total_slices", "avg_slices", "avg_paths"
    );
    let results = results
        .into_iter()
        .sorted_by(|(a, _), (b, _)| a.fmt(&net).cmp(&b.fmt(&net)))
        .collect_vec();
    for (sw, analysis) in results.iter() {
        let summary = analysis.summary();
        println!(
            "{:>15}{:>12}{:>14}{:>12.3}{:>12.3}",
            sw.fmt(&net),
            summary.used_rules,
            summary.total_slices,
            summary.avg_slice_size,
            summary.avg_path_len
        );
        let failed = emitter.emit_all(analysis.classes.iter());
        if failed > 0 {
            log::error!("Failed to emit {} equivalence classes of {}", failed, sw.fmt(&net));
        }
    }
    println!("{DELIMITER}");

    println!("{:>15}{:>12}{:>12}{:>12}  path", "Name", "id", "size", "path len");
    for (sw, analysis) in results.iter() {
        let slices = analysis
            .slices
            .iter()
            .sorted_by_key(|s| s.rules.len())
            .enumerate();
        for (id, slice) in slices {
            println!(
                "{:>15}{:>12}{:>12}{:>12}  {}",
                sw.fmt(&net),
                id + 1,
                slice.rules.len(),
                slice.path.len(),
                slice.path.fmt(&net)
            );
        }
    }

    Ok(())
}
