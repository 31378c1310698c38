use anyhow::Result;
use clap::Parser;
use pls::cli::{self, Cli, Command};
use pls::config::Config;
use pls::core::{FuzzyRanker, SearchField, Strategy};
use pls::sources::{reconcile, JsonFileSource, PlaylistSource, SourceEngine, YtDlpSource};
use pls::{Error, Store};
use std::io::Cursor;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

const PLAYLIST_JSON: &str = r#"{
    "id": "PLA9DML3OBu8nAICrUUCYTkELNoyMPzv2m",
    "title": "(G)I-DLE",
    "availability": "public",
    "description": "",
    "playlist_count": 5,
    "modified_date": "20231125",
    "channel": "sutoremnja",
    "channel_id": "UCm2XsKMy-20_IVmSX9iSqEA",
    "uploader_id": "@sutorenjaa",
    "entries": [
        {
            "id": "rlHBvH87G14",
            "title": "(G)I-DLE making me question their sanity",
            "description": "funny moments\ncompilation",
            "channel": "Alydle",
            "channel_id": "UCyehyeobbunn",
            "uploader_id": "@Yehyeobbunn",
            "view_count": 258948,
            "duration": 447,
            "thumbnails": [
                {"url": "https://i.ytimg.com/small.jpg", "width": 168, "height": 94},
                {"url": "https://i.ytimg.com/big.jpg", "width": 336, "height": 188}
            ]
        },
        {
            "id": "aaaaaaaaaaa",
            "title": "Queencard dance practice",
            "channel": "(G)I-DLE (여자)아이들 (Official YouTube Channel)",
            "channel_id": "UCritGVo7pLJLUS8wEu32vow",
            "uploader_id": null,
            "view_count": 1000,
            "duration": 3661
        },
        {
            "id": "bbbbbbbbbbb",
            "title": "Live stream archive",
            "channel": "Alydle",
            "channel_id": "UCyehyeobbunn",
            "uploader_id": "@Yehyeobbunn",
            "view_count": null,
            "duration": 86400
        },
        {
            "id": "rlHBvH87G14",
            "title": "(G)I-DLE making me question their sanity",
            "channel": "Alydle"
        }
    ]
}"#;

fn write_playlist(dir: &Path) -> Result<PathBuf> {
    let path = dir.join("playlist.json");
    std::fs::write(&path, PLAYLIST_JSON)?;
    Ok(path)
}

async fn ingest(dir: &Path) -> Result<PathBuf> {
    let json = write_playlist(dir)?;
    let db = dir.join("playlist.sqlite");
    let cli = Cli::parse_from([
        "pls",
        "get",
        json.to_str().unwrap(),
        "--db",
        db.to_str().unwrap(),
        "--quiet",
    ]);
    let Command::Get(args) = &cli.command else {
        panic!("expected get");
    };
    cli::get(args, &Config::default()).await?;
    Ok(db)
}

fn list_output(db: &Path, extra: &[&str], config: &Config) -> Result<String> {
    let mut argv = vec!["pls", "list", db.to_str().unwrap()];
    argv.extend_from_slice(extra);
    let cli = Cli::parse_from(argv);
    let Command::List(args) = &cli.command else {
        panic!("expected list");
    };
    let mut out = Vec::new();
    cli::list(args, config, &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[tokio::test]
async fn test_source_engine_initialization() -> Result<()> {
    let mut engine = SourceEngine::new();
    engine.register_source(Box::new(JsonFileSource));
    engine.register_source(Box::new(YtDlpSource::new("yt-dlp", false)));

    assert_eq!(engine.sources.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_source_engine_rejects_unknown_input() -> Result<()> {
    let mut engine = SourceEngine::new();
    engine.register_source(Box::new(JsonFileSource));
    engine.register_source(Box::new(YtDlpSource::new("yt-dlp", false)));

    let err = engine.fetch("https://vimeo.com/123456").await.unwrap_err();
    assert!(matches!(err, Error::Source(_)));
    Ok(())
}

#[tokio::test]
async fn test_json_file_source_and_reconcile() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_playlist(dir.path())?;
    let input = path.to_str().unwrap();

    assert!(JsonFileSource.suitable(input));
    let mut playlist = JsonFileSource.fetch(input).await?;
    assert_eq!(playlist.title, "(G)I-DLE");
    assert_eq!(playlist.entries.len(), 4);

    let problems = reconcile(&mut playlist);
    assert_eq!(problems.len(), 2);
    assert_eq!(playlist.entries.len(), 3);
    assert_eq!(playlist.entries[0].biggest_thumbnail().url, "https://i.ytimg.com/big.jpg");
    Ok(())
}

#[tokio::test]
async fn test_get_stores_playlist_in_order() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db = ingest(dir.path()).await?;

    let store = Store::open(&db)?;
    let ids: Vec<String> = store.find_all()?.into_iter().map(|v| v.id).collect();
    assert_eq!(ids, vec!["rlHBvH87G14", "aaaaaaaaaaa", "bbbbbbbbbbb"]);

    // Fetching again stores nothing new.
    ingest(dir.path()).await?;
    assert_eq!(Store::open(&db)?.count()?, 3);
    Ok(())
}

#[tokio::test]
async fn test_list_formats_every_video() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db = ingest(dir.path()).await?;

    let out = list_output(&db, &[], &Config::default())?;
    assert_eq!(
        out,
        "1: (G)I-DLE making me question their sanity\n2: Queencard dance practice\n3: Live stream archive\n"
    );

    let config = Config {
        format: "{Index} [{DurationString}] {ChannelUrl} {Missing}".to_string(),
        ..Config::default()
    };
    let out = list_output(&db, &["-n", "2"], &config)?;
    assert_eq!(
        out,
        "1 [07:27] youtube.com/@Yehyeobbunn {Missing}\n\
         2 [01:01:01] youtube.com/channel/UCritGVo7pLJLUS8wEu32vow {Missing}\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_list_with_query() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db = ingest(dir.path()).await?;

    let config = Config {
        format: "{VideoId}".to_string(),
        field: SearchField::Title,
        ..Config::default()
    };
    let out = list_output(&db, &["-q", "queencard"], &config)?;
    assert_eq!(out, "aaaaaaaaaaa\n");

    let channel = Config { field: SearchField::Channel, ..config.clone() };
    let out = list_output(&db, &["-q", "alydle"], &channel)?;
    assert_eq!(out, "rlHBvH87G14\nbbbbbbbbbbb\n");

    let strict = Config { strategy: Strategy::Strict, ..config };
    let err = list_output(&db, &["-q", "QUEENCARD"], &strict).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NoMatch { .. })));
    Ok(())
}

#[tokio::test]
async fn test_has() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db = ingest(dir.path()).await?;
    let db = db.to_str().unwrap();

    for (url, expected) in [
        ("https://www.youtube.com/watch?v=aaaaaaaaaaa", "true\n"),
        ("https://www.youtube.com/watch?v=zzzzzzzzzzz", "false\n"),
    ] {
        let cli = Cli::parse_from(["pls", "has", db, url]);
        let Command::Has(args) = &cli.command else {
            panic!("expected has");
        };
        let mut out = Vec::new();
        cli::has(args, &mut out)?;
        assert_eq!(String::from_utf8(out)?, expected);
    }
    Ok(())
}

#[tokio::test]
async fn test_browse_pages_through_store() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db = ingest(dir.path()).await?;

    let config = Config {
        page_size: NonZeroUsize::new(2).unwrap(),
        ..Config::default()
    };
    // Two steps down reach the last video, so the third is ignored.
    let input = Cursor::new("j\nj\nj\n\nq\n");
    let mut out = Vec::new();
    cli::browse(&db, &config, input, &mut out)?;
    let out = String::from_utf8(out)?;

    assert!(out.starts_with("> 1: (G)I-DLE making me question their sanity\n  2: Queencard dance practice\n"));
    assert!(out.contains("  2: Queencard dance practice\n> 3: Live stream archive\n-- 3/3"));
    assert!(out.contains("youtube.com/watch?v=bbbbbbbbbbb\n"));
    Ok(())
}

#[tokio::test]
async fn test_missing_database_is_not_created() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db = dir.path().join("typo.sqlite");

    assert!(list_output(&db, &[], &Config::default()).is_err());
    assert!(!db.exists());
    Ok(())
}

#[tokio::test]
async fn test_ranker_keys_by_identity() -> Result<()> {
    let ranker = FuzzyRanker::new(Strategy::NormalizedFold);
    let candidates = vec![
        ("id-1", "Alydle - Song".to_string()),
        ("id-2", "Alydle - Song".to_string()),
        ("id-3", "Other - Thing".to_string()),
    ];
    assert_eq!(ranker.rank("alydle - song", candidates), vec!["id-1", "id-2"]);
    Ok(())
}
