use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "speech-relay",
    version,
    about = "Speech Relay - HTTP front for a hosted speech-to-text provider",
    long_about = "Relays uploaded audio files to Groq's transcription API and returns the text as JSON. Also ships a small client for sending files to a running relay.",
    after_help = "EXAMPLES:\n    # Start the relay (needs GROQ_API_KEY)\n    speech-relay serve\n\n    # Listen on a different port\n    speech-relay serve --port 8080\n\n    # Transcribe a local file through a running relay\n    speech-relay file meeting.m4a\n\n    # Ask for segment timestamps in French\n    speech-relay file interview.mp3 --timestamps --language fr\n\n    # Use a relay on another host\n    speech-relay file audio.wav --server-url http://relay:5001"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(name = "serve")]
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(long, env = "PORT", default_value = "5001")]
        port: u16,
    },
    #[command(name = "file")]
    TranscribeFile {
        audio_file: String,

        #[arg(long, default_value = "http://localhost:5001")]
        server_url: String,

        #[arg(long)]
        language: Option<String>,

        #[arg(long)]
        model: Option<String>,

        /// Request segment-level timestamps
        #[arg(long)]
        timestamps: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_defaults_bind_all_interfaces() {
        let cli = Cli::try_parse_from(["speech-relay", "serve", "--port", "5001"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, "0.0.0.0");
                assert_eq!(port, 5001);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn file_command_collects_options() {
        let cli = Cli::try_parse_from([
            "speech-relay",
            "file",
            "clip.wav",
            "--language",
            "de",
            "--timestamps",
        ])
        .unwrap();
        match cli.command {
            Commands::TranscribeFile {
                audio_file,
                server_url,
                language,
                model,
                timestamps,
            } => {
                assert_eq!(audio_file, "clip.wav");
                assert_eq!(server_url, "http://localhost:5001");
                assert_eq!(language.as_deref(), Some("de"));
                assert_eq!(model, None);
                assert!(timestamps);
            }
            _ => panic!("expected file"),
        }
    }

    #[test]
    fn rejects_non_numeric_port() {
        assert!(Cli::try_parse_from(["speech-relay", "serve", "--port", "http"]).is_err());
    }
}
