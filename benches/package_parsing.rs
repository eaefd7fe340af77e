//! Benchmarks for TheTVDB package parsing
//!
//! Covers the XML document parser, the zip extraction path and the search
//! response parser.

use std::io::{Cursor, Write};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use showforged::metadata::package::parse_search_response;
use showforged::metadata::{DocumentParser, TvdbPackageParser};

const SEARCH_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<Data>
  <Series>
    <seriesid>42</seriesid>
    <language>en</language>
    <SeriesName>Sample Show</SeriesName>
    <banner>graphical/42-g.jpg</banner>
    <Overview>A show about samples.</Overview>
    <FirstAired>2008-01-20</FirstAired>
    <id>42</id>
  </Series>
</Data>"#;

/// Build a package document with `episodes` episodes spread over seasons of ten.
fn package_xml(episodes: u32) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" ?>
<Data>
  <Series>
    <id>42</id>
    <Actors>|Jane Doe|John Roe|Max Moe|</Actors>
    <FirstAired>2008-01-20</FirstAired>
    <Genre>|Drama|Crime|Thriller|</Genre>
    <IMDB_ID>tt0000042</IMDB_ID>
    <Language>en</Language>
    <Overview>A show about samples, and the people who take them.</Overview>
    <Rating>8.5</Rating>
    <SeriesName>Sample Show</SeriesName>
    <Status>Continuing</Status>
    <banner>graphical/42-g.jpg</banner>
    <fanart>fanart/original/42-1.jpg</fanart>
    <poster>posters/42-1.jpg</poster>
    <zap2it_id>SH0042</zap2it_id>
  </Series>
"#,
    );

    for n in 0..episodes {
        let season = n / 10 + 1;
        let number = n % 10 + 1;
        xml.push_str(&format!(
            r#"  <Episode>
    <id>{id}</id>
    <Director>|Ann Director|</Director>
    <EpisodeName>Episode {season}x{number}</EpisodeName>
    <EpisodeNumber>{number}</EpisodeNumber>
    <FirstAired>2008-02-{day:02}</FirstAired>
    <GuestStars>|Guest One|Guest Two|</GuestStars>
    <Overview><![CDATA[Things happen & then more things happen.]]></Overview>
    <SeasonNumber>{season}</SeasonNumber>
    <absolute_number>{absolute}</absolute_number>
    <filename>episodes/42/{id}.jpg</filename>
    <seriesid>42</seriesid>
  </Episode>
"#,
            id = 1000 + n,
            day = number,
            absolute = n + 1,
        ));
    }

    xml.push_str("</Data>\n");
    xml
}

fn zip_package(language: &str, xml: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(
            format!("{language}.xml"),
            zip::write::SimpleFileOptions::default(),
        )
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

fn bench_xml_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("package_xml");
    let parser = TvdbPackageParser::default();

    for episodes in [10u32, 100, 500] {
        let xml = package_xml(episodes);
        group.throughput(Throughput::Bytes(xml.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse_xml", episodes), &xml, |b, xml| {
            b.iter(|| parser.parse_xml(black_box(xml)).unwrap());
        });
    }

    group.finish();
}

fn bench_archive_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("package_archive");
    let parser = TvdbPackageParser::default();

    for episodes in [10u32, 100] {
        let archive = zip_package("en", &package_xml(episodes));
        group.throughput(Throughput::Bytes(archive.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("parse", episodes),
            &archive,
            |b, archive| {
                b.iter(|| parser.parse(black_box(archive), "en").unwrap());
            },
        );
    }

    group.finish();
}

fn bench_search_response(c: &mut Criterion) {
    c.bench_function("search_response", |b| {
        b.iter(|| parse_search_response(black_box(SEARCH_RESPONSE)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_xml_parsing,
    bench_archive_parsing,
    bench_search_response
);
criterion_main!(benches);
