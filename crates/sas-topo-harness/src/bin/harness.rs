//! CLI entrypoint for the SAS fabric topology harness.

use clap::{Parser, Subcommand};
use sas_topo::{SasFmri, TopoError, VertexIdentity, VertexKind};

/// Exercises the SAS fabric topology enumerator against its fixture and
/// FMRI codec.
#[derive(Debug, Parser)]
#[command(name = "sas-topo-harness")]
#[command(about = "Exercises the SAS fabric topology enumerator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run `enumerate()` against the S1 fixture and report invariant
    /// compliance plus the reachable path count.
    Fixture,
    /// Round-trip a `sas://` FMRI string through decode/encode and report
    /// codec-law compliance.
    FmriCheck {
        /// The FMRI text to check, e.g. `sas://type=pathnode/port=1`.
        text: String,
    },
    /// Dump the S1 fixture graph as text.
    FakeTopology,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Fixture => run_fixture(),
        Command::FmriCheck { text } => run_fmri_check(&text),
        Command::FakeTopology => run_fake_topology(),
    }
}

fn run_fixture() -> Result<(), Box<dyn std::error::Error>> {
    let (graph, side) = sas_topo_fixture_exec::build_fixture()?;

    let mut pass = true;

    // I1 — every target has exactly one incoming edge from a matching port.
    for (handle, vertex) in graph.vertices() {
        if vertex.kind() != VertexKind::Target {
            continue;
        }
        let incoming = graph.in_neighbors(handle);
        let ok = incoming.len() == 1
            && graph.vertex(incoming[0]).kind() == VertexKind::Port
            && graph.vertex(incoming[0]).sas_address() == vertex.sas_address();
        if !ok {
            pass = false;
            println!("I1 FAIL: target {:?}", vertex.sas_address());
        }
    }

    // I2 — every port has <= 1 incoming and <= 1 outgoing edge.
    for (handle, vertex) in graph.vertices() {
        if vertex.kind() != VertexKind::Port {
            continue;
        }
        if graph.in_neighbors(handle).len() > 1 || graph.out_neighbors(handle).len() > 1 {
            pass = false;
            println!("I2 FAIL: port {:?}", vertex.sas_address());
        }
    }

    // I3 — consecutive ports on a path mirror each other's address.
    for (handle, vertex) in graph.vertices() {
        if vertex.kind() != VertexKind::Port {
            continue;
        }
        for &next in graph.out_neighbors(handle) {
            if graph.vertex(next).kind() != VertexKind::Port {
                continue;
            }
            let left = side.get(handle);
            let right = side.get(next);
            let ok = left.is_some_and(|l| l.attached_wwn == Some(graph.vertex(next).sas_address()))
                && right.is_some_and(|r| r.attached_wwn == Some(graph.vertex(handle).sas_address()));
            if !ok {
                pass = false;
                println!("I3 FAIL: {:?} -> {:?}", vertex.sas_address(), graph.vertex(next).sas_address());
            }
        }
    }

    let initiator = graph.lookup(VertexIdentity::Address(
        VertexKind::Initiator,
        sas_topo::SasAddress::new(sas_topo_fixture_exec::INITIATOR_ADDR),
    ));
    let reachable_count = initiator.map_or(0, |_| sas_topo_fixture_exec::reachable_target_count(&graph));
    if initiator.is_none() {
        pass = false;
        println!("no initiator vertex found");
    }

    println!(
        "reachable target count: {reachable_count} (expected {})",
        sas_topo_fixture_exec::EXPECTED_PATH_COUNT
    );
    pass &= reachable_count == sas_topo_fixture_exec::EXPECTED_PATH_COUNT;

    println!("{}", if pass { "PASS" } else { "FAIL" });
    if pass {
        Ok(())
    } else {
        Err("fixture invariant check failed".into())
    }
}

fn run_fmri_check(text: &str) -> Result<(), Box<dyn std::error::Error>> {
    match sas_topo::str2nvl(0, text) {
        Ok(decoded) => {
            println!("decoded: {decoded:?}");
            match sas_topo::nvl2str(0, &decoded) {
                Ok(reencoded) if reencoded == text => {
                    println!("L2 (canonical text) holds: round-trip matches input");
                    report_roundtrip(&decoded)?;
                    Ok(())
                }
                Ok(reencoded) => {
                    println!("L2 FAIL: re-encoded as {reencoded:?}, expected {text:?}");
                    Err("codec law L2 violated".into())
                }
                Err(err) => {
                    println!("encode of decoded value failed: {err}");
                    Err(err.into())
                }
            }
        }
        Err(TopoError::Fmri(err)) => {
            println!("rejected (L4): {err}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn report_roundtrip(decoded: &SasFmri) -> Result<(), Box<dyn std::error::Error>> {
    let text = sas_topo::nvl2str(0, decoded)?;
    let redecoded = sas_topo::str2nvl(0, &text)?;
    if &redecoded == decoded {
        println!("L1 (round-trip) holds");
        Ok(())
    } else {
        println!("L1 FAIL: decode(encode(n)) != n");
        Err("codec law L1 violated".into())
    }
}

fn run_fake_topology() -> Result<(), Box<dyn std::error::Error>> {
    let (graph, side) = sas_topo_fixture_exec::build_fixture()?;
    for (handle, vertex) in graph.vertices() {
        let side_note = side
            .get(handle)
            .map(|s| format!(" attached={:?} origin={:?}", s.attached_wwn, s.origin))
            .unwrap_or_default();
        println!(
            "{:?} {:?} addr={}{side_note}",
            handle,
            vertex.kind(),
            vertex.sas_address()
        );
        for &next in graph.out_neighbors(handle) {
            println!("  -> {next:?}");
        }
    }
    Ok(())
}
