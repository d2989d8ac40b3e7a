use clap::Parser;
use rtc_media::{MediaEngine, RtpCodecKind, RtpCodecParameters, StatsReport};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "codec-registry",
    about = "Inspect the default WebRTC codec and header-extension registry"
)]
struct Args {
    /// Only show this media kind (audio or video)
    #[arg(long, short)]
    kind: Option<String>,

    /// Look up a single payload type (requires --kind)
    #[arg(long, short, requires = "kind")]
    lookup: Option<u8>,

    /// Print the video codec stats report
    #[arg(long)]
    stats: bool,
}

fn print_codec(codec: &RtpCodecParameters) {
    let cap = &codec.capability;
    print!("  {:>3}  {}/{}", codec.payload_type, cap.mime_type, cap.clock_rate);
    if cap.channels > 1 {
        print!("/{}", cap.channels);
    }
    if !cap.sdp_fmtp_line.is_empty() {
        print!("  fmtp:{}", cap.sdp_fmtp_line);
    }
    println!("  [{}]", codec.stats_id());
    for fb in &cap.rtcp_feedback {
        if fb.parameter.is_empty() {
            println!("         rtcp-fb: {}", fb.typ);
        } else {
            println!("         rtcp-fb: {} {}", fb.typ, fb.parameter);
        }
    }
}

fn print_kind(engine: &MediaEngine, kind: RtpCodecKind) {
    println!("{} codecs:", kind);
    for codec in engine.codecs_by_kind(kind) {
        print_codec(codec);
    }
    println!("{} header extensions:", kind);
    for ext in engine.header_extensions_by_kind(kind) {
        println!("  {}", ext.uri);
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut engine = MediaEngine::new();
    if let Err(e) = engine.register_default_codecs() {
        eprintln!("Failed to register default codecs: {}", e);
        return ExitCode::FAILURE;
    }

    let kinds = match args.kind.as_deref().map(RtpCodecKind::from) {
        None => vec![RtpCodecKind::Audio, RtpCodecKind::Video],
        Some(RtpCodecKind::Unspecified) => {
            eprintln!("--kind must be audio or video");
            return ExitCode::FAILURE;
        }
        Some(kind) => vec![kind],
    };

    if let Some(pt) = args.lookup {
        match engine.lookup_codec(pt, kinds[0]) {
            Ok(codec) => print_codec(&codec),
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        for kind in kinds {
            print_kind(&engine, kind);
        }
    }

    if args.stats {
        let report = StatsReport::new();
        engine.collect_stats(&report);
        println!("codec stats:");
        for s in report.snapshots() {
            println!(
                "  {}  pt={} {}/{} channels={} {}",
                s.id, s.payload_type, s.mime_type, s.clock_rate, s.channels, s.sdp_fmtp_line
            );
        }
    }

    ExitCode::SUCCESS
}
