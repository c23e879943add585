//! Predicate analyzer - analyze boolean predicates over declared columns

use anyhow::{anyhow, bail, Context, Result};
use bytes::BytesMut;
use clap::Parser as ClapParser;
use predicate_analyzer::analyzer::{Analyzer, AnalyzerConfig, ColumnStats, DEFAULT_MAX_EXPR_DEPTH};
use predicate_analyzer::catalog::FunctionCatalog;
use predicate_analyzer::expression::rewrite::{conjuncts, push_down_negation};
use predicate_analyzer::term::parse_term_with_limit;
use predicate_analyzer::types::DataType;
use predicate_analyzer::wire;
use std::sync::Arc;

/// Analyze a predicate written in prefix term notation,
/// e.g. `and(eq(id, 5), not(in(region, 'eu', 'us')))`
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Predicate to analyze
    predicate: String,

    /// Declare a column as NAME:TYPE[:NDV]
    #[arg(short, long = "column", value_name = "NAME:TYPE[:NDV]")]
    columns: Vec<String>,

    /// Also print the negated predicate
    #[arg(short, long)]
    negate: bool,

    /// Push negations down to the leaves before analysis
    #[arg(long)]
    normalize: bool,

    /// Print the serialized node list
    #[arg(short, long)]
    wire: bool,

    /// Deepest expression tree accepted
    #[arg(long, default_value_t = DEFAULT_MAX_EXPR_DEPTH)]
    max_expr_depth: usize,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// Parse a `NAME:TYPE[:NDV]` column declaration
fn parse_column(decl: &str) -> Result<(String, DataType, ColumnStats)> {
    let parts: Vec<&str> = decl.split(':').collect();
    let (name, type_name, ndv) = match parts.as_slice() {
        [name, type_name] => (*name, *type_name, None),
        [name, type_name, ndv] => (*name, *type_name, Some(*ndv)),
        _ => bail!("expected NAME:TYPE[:NDV], got '{}'", decl),
    };
    if name.is_empty() {
        bail!("empty column name in '{}'", decl);
    }
    let data_type =
        DataType::from_sql(type_name).ok_or_else(|| anyhow!("unknown type '{}'", type_name))?;
    let stats = match ndv {
        Some(ndv) => ColumnStats::with_ndv(
            ndv.parse()
                .with_context(|| format!("invalid NDV '{}' for column '{}'", ndv, name))?,
        ),
        None => ColumnStats::default(),
    };
    Ok((name.to_string(), data_type, stats))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let catalog = Arc::new(FunctionCatalog::with_builtins());
    let mut analyzer = Analyzer::with_config(
        catalog,
        AnalyzerConfig {
            max_expr_depth: args.max_expr_depth,
        },
    );
    for decl in &args.columns {
        let (name, data_type, stats) =
            parse_column(decl).with_context(|| format!("Invalid column '{}'", decl))?;
        analyzer.register_column(name, data_type, stats);
    }

    let mut expr = parse_term_with_limit(&args.predicate, args.max_expr_depth)
        .context("Failed to parse predicate")?;
    if args.normalize {
        expr = push_down_negation(expr);
    }
    analyzer
        .analyze(&mut expr)
        .context("Failed to analyze predicate")?;

    println!("sql:         {}", expr.to_sql());
    println!("type:        {}", expr.data_type());
    println!("selectivity: {}", expr.selectivity());
    println!("depth:       {}", expr.depth());

    if let Some(combinator) = expr.as_logical_combinator() {
        let slots: Vec<String> = combinator
            .bound_slots()
            .iter()
            .map(|slot| slot.label().to_string())
            .collect();
        println!("bound slots: [{}]", slots.join(", "));
    }

    let parts = conjuncts(&expr);
    if parts.len() > 1 {
        println!("conjuncts:");
        for part in parts {
            println!("  {}  (selectivity {})", part.to_sql(), part.selectivity());
        }
    }

    if args.negate {
        let mut negated = expr.negate();
        analyzer
            .analyze(&mut negated)
            .context("Failed to analyze negated predicate")?;
        println!("negated:     {}", negated.to_sql());
        println!("  selectivity: {}", negated.selectivity());
    }

    if args.wire {
        let mut buf = BytesMut::new();
        wire::encode(&expr, &mut buf).context("Failed to encode predicate")?;
        println!("wire:        {} bytes", buf.len());
        for (i, node) in wire::tree_to_wire(&expr).iter().enumerate() {
            println!(
                "  {:>3} {:?} {} children={} fn={} selectivity={}",
                i,
                node.node_type,
                node.data_type,
                node.num_children,
                node.fn_name.as_deref().unwrap_or("-"),
                node.selectivity()
            );
        }
    }

    Ok(())
}
