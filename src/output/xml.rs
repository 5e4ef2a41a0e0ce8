//! XML report tree
//!
//! Mirrors the original tool's hand-built `<tag value="..">..</tag>` output
//! (`print_xml_tag_number`/`_size`/`_time` in `diskBench.c`) but built with
//! `quick-xml`'s event writer instead of string concatenation. Numeric
//! leaves carry a `value=` attribute with the raw integer (microseconds or
//! bytes) and, for sizes and durations, a `formatted=` attribute with a
//! human-readable rendering; the element's text content repeats the raw
//! value, exactly as the original did.

use crate::stats::{Aggregate, Statistics, TestLine};
use crate::util::time::{format_bytes, format_duration, format_rate, format_throughput};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

fn open(w: &mut Writer<Cursor<Vec<u8>>>, tag: &str) -> quick_xml::Result<()> {
    w.write_event(Event::Start(BytesStart::new(tag)))
}

fn close(w: &mut Writer<Cursor<Vec<u8>>>, tag: &str) -> quick_xml::Result<()> {
    w.write_event(Event::End(BytesEnd::new(tag)))
}

fn number(w: &mut Writer<Cursor<Vec<u8>>>, tag: &str, n: u64) -> quick_xml::Result<()> {
    let mut start = BytesStart::new(tag);
    start.push_attribute(("value", n.to_string().as_str()));
    w.write_event(Event::Start(start))?;
    w.write_event(Event::Text(BytesText::new(&n.to_string())))?;
    close(w, tag)
}

fn bytes(w: &mut Writer<Cursor<Vec<u8>>>, tag: &str, n: u64) -> quick_xml::Result<()> {
    let formatted = format_bytes(n);
    let mut start = BytesStart::new(tag);
    start.push_attribute(("formatted", formatted.as_str()));
    start.push_attribute(("value", n.to_string().as_str()));
    w.write_event(Event::Start(start))?;
    w.write_event(Event::Text(BytesText::new(&n.to_string())))?;
    close(w, tag)
}

fn throughput(w: &mut Writer<Cursor<Vec<u8>>>, tag: &str, bytes_per_sec: f64) -> quick_xml::Result<()> {
    let raw = bytes_per_sec as u64;
    let mut start = BytesStart::new(tag);
    start.push_attribute(("formatted", format_throughput(bytes_per_sec).as_str()));
    start.push_attribute(("value", raw.to_string().as_str()));
    w.write_event(Event::Start(start))?;
    w.write_event(Event::Text(BytesText::new(&raw.to_string())))?;
    close(w, tag)
}

fn rate(w: &mut Writer<Cursor<Vec<u8>>>, tag: &str, ops_per_sec: f64) -> quick_xml::Result<()> {
    let raw = ops_per_sec as u64;
    let mut start = BytesStart::new(tag);
    start.push_attribute(("formatted", format_rate(ops_per_sec).as_str()));
    start.push_attribute(("value", raw.to_string().as_str()));
    w.write_event(Event::Start(start))?;
    w.write_event(Event::Text(BytesText::new(&raw.to_string())))?;
    close(w, tag)
}

fn time(w: &mut Writer<Cursor<Vec<u8>>>, tag: &str, d: Duration) -> quick_xml::Result<()> {
    let micros = d.as_micros() as u64;
    let mut start = BytesStart::new(tag);
    start.push_attribute(("formatted", format_duration(d).as_str()));
    start.push_attribute(("value", micros.to_string().as_str()));
    w.write_event(Event::Start(start))?;
    w.write_event(Event::Text(BytesText::new(&micros.to_string())))?;
    close(w, tag)
}

fn write_test_line(w: &mut Writer<Cursor<Vec<u8>>>, line: &TestLine) -> quick_xml::Result<()> {
    open(w, "test_run")?;

    let mut start = BytesStart::new("description");
    start.push_attribute(("value", line.description.as_str()));
    w.write_event(Event::Start(start))?;
    w.write_event(Event::Text(BytesText::new(&line.description)))?;
    close(w, "description")?;

    number(w, "request_size", line.req_size)?;
    number(w, "queue_depth", line.depth as u64)?;
    number(w, "concurrent_ios", line.max_active as u64)?;
    throughput(w, "bytes_per_second", line.bytes_per_second())?;
    rate(w, "iops", line.iops())?;
    bytes(w, "bytes_written", line.bytes_written)?;
    bytes(w, "bytes_read", line.bytes_read)?;
    number(w, "write_requests", line.write_requests)?;
    number(w, "read_requests", line.read_requests)?;
    time(w, "time_elapsed", line.total_elapsed)?;
    time(w, "min_latency", line.min_latency.unwrap_or_default())?;
    time(w, "avg_latency", line.avg_latency)?;
    time(w, "max_latency", line.max_latency.unwrap_or_default())?;

    write_workloads(w, line)?;

    close(w, "test_run")
}

/// Per-worker raw counters for one test point - the original tool's
/// `workloads/workload` list, one `workload` per participating file.
fn write_workloads(w: &mut Writer<Cursor<Vec<u8>>>, line: &TestLine) -> quick_xml::Result<()> {
    open(w, "workloads")?;
    for worker in &line.workers {
        open(w, "workload")?;
        number(w, "worker", worker.index as u64)?;
        number(w, "depth", worker.queue_depth as u64)?;
        bytes(w, "bytes_written", worker.stats.write_bytes)?;
        bytes(w, "bytes_read", worker.stats.read_bytes)?;
        number(w, "write_requests", worker.stats.write_requests)?;
        number(w, "read_requests", worker.stats.read_requests)?;
        time(w, "wait_time_write", worker.stats.write_elapsed)?;
        time(w, "wait_time_read", worker.stats.read_elapsed)?;
        time(w, "min_write_latency", worker.stats.write_min_latency)?;
        time(w, "max_write_latency", worker.stats.write_max_latency)?;
        time(w, "min_read_latency", worker.stats.read_min_latency)?;
        time(w, "max_read_latency", worker.stats.read_max_latency)?;
        close(w, "workload")?;
    }
    close(w, "workloads")
}

fn write_statistics(w: &mut Writer<Cursor<Vec<u8>>>, statistics: &Statistics) -> quick_xml::Result<()> {
    let mut start = BytesStart::new("test");
    start.push_attribute(("name", statistics.name.as_str()));
    w.write_event(Event::Start(start))?;
    for line in &statistics.lines {
        write_test_line(w, line)?;
    }
    close(w, "test")
}

fn write_aggregate(w: &mut Writer<Cursor<Vec<u8>>>, aggregate: &Aggregate) -> quick_xml::Result<()> {
    open(w, "summary")?;
    bytes(w, "total_bytes", aggregate.total_bytes)?;
    number(w, "total_requests", aggregate.total_requests)?;
    throughput(w, "min_throughput", aggregate.min_line_throughput)?;
    throughput(w, "max_throughput", aggregate.max_line_throughput)?;
    throughput(w, "weighted_score", aggregate.score())?;
    number(w, "peak_active", aggregate.peak_active as u64)?;
    close(w, "summary")
}

/// Render the full report (`diskBench > {prepare_and_validate, tests, summary}`)
/// and write it to `path`.
pub fn write_report(path: &Path, tests: &[Statistics], aggregate: &Aggregate) -> crate::Result<()> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(quick_xml::events::BytesDecl::new("1.0", None, None)))?;

    open(&mut writer, "diskBench")?;
    open(&mut writer, "prepare_and_validate")?;
    close(&mut writer, "prepare_and_validate")?;

    open(&mut writer, "tests")?;
    for statistics in tests {
        write_statistics(&mut writer, statistics)?;
    }
    close(&mut writer, "tests")?;

    write_aggregate(&mut writer, aggregate)?;
    close(&mut writer, "diskBench")?;

    let buf = writer.into_inner().into_inner();
    std::fs::write(path, buf).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::WorkerContribution;
    use crate::queue::QueueStats;

    #[test]
    fn write_report_produces_well_formed_xml() {
        let stats_counters = QueueStats { read_requests: 10, read_bytes: 40960, ..QueueStats::default() };
        let contribution = WorkerContribution {
            stats: stats_counters,
            elapsed: Duration::from_secs(1),
            weighted_io_size: 4096,
            queue_depth: 4,
            max_active: 4,
        };
        let line = TestLine::combine("Random read", 4096, 4, &[contribution]).unwrap();
        let mut statistics = Statistics::new("Random read");
        statistics.push(line);
        let mut aggregate = Aggregate::default();
        aggregate.absorb(&statistics.lines[0]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xml");
        write_report(&path, &[statistics], &aggregate).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<?xml"));
        assert!(content.contains("<diskBench>"));
        assert!(content.contains("test_run"));
        assert!(content.contains("weighted_score"));
    }

    #[test]
    fn test_run_lists_one_workload_per_participating_worker() {
        let contributions: Vec<WorkerContribution> = (0..2)
            .map(|_| WorkerContribution {
                stats: QueueStats { read_requests: 10, read_bytes: 40960, ..QueueStats::default() },
                elapsed: Duration::from_secs(1),
                weighted_io_size: 4096,
                queue_depth: 4,
                max_active: 4,
            })
            .collect();
        let line = TestLine::combine("Random read", 4096, 4, &contributions).unwrap();
        assert_eq!(line.workers.len(), 2);
        assert_eq!(line.workers[0].index, 0);
        assert_eq!(line.workers[1].index, 1);

        let mut statistics = Statistics::new("Random read");
        statistics.push(line);
        let mut aggregate = Aggregate::default();
        aggregate.absorb(&statistics.lines[0]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xml");
        write_report(&path, &[statistics], &aggregate).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("<workload>").count(), 2);
        assert!(content.contains("<worker value=\"0\">0</worker>"));
        assert!(content.contains("<worker value=\"1\">1</worker>"));
    }
}
