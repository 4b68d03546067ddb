//! Report parsing against captured `kubectl top` output.
use kubetop_agent::report::{
    parse_node_report, parse_node_report_detailed, parse_pod_report, parse_pod_report_detailed,
};
use kubetop_agent::types::{NodeSample, PodSample};

const PODS: &str = "\
NAME                                CPU(cores)   MEMORY(bytes)
coredns-5dd5756b68-7xk2p            3m           14Mi
solver-7f9c8d6b5-qwz4t              812m         402Mi
av-bridge-0                         41m          96Mi
";

const NODES: &str = "\
NAME           CPU(cores)   CPU%   MEMORY(bytes)   MEMORY%
edge-node-1    1203m        30%    5120Mi          65%
edge-node-2    87m          2%     1911Mi          24%
";

#[test]
fn pod_example_rows_and_messages() {
    let samples = parse_pod_report("NAME CPU MEM\npodA 5m 10Mi\npodB 7m 20Mi\n");
    assert_eq!(
        samples,
        vec![
            PodSample {
                name: "podA".into(),
                cpu: "5m".into(),
                memory: "10Mi".into()
            },
            PodSample {
                name: "podB".into(),
                cpu: "7m".into(),
                memory: "20Mi".into()
            },
        ]
    );
    let msgs: Vec<String> = samples.iter().map(|s| s.to_string()).collect();
    assert_eq!(
        msgs,
        ["podA: CPU=5m, Memory=10Mi", "podB: CPU=7m, Memory=20Mi"]
    );
}

#[test]
fn node_example_row_and_message() {
    let samples = parse_node_report("NODE CPU% CPU MEM% MEM\nn1 200m 5% 512Mi 10%\n");
    assert_eq!(
        samples,
        vec![NodeSample {
            name: "n1".into(),
            cpu_cores: "200m".into(),
            cpu_percent: "5%".into(),
            memory_bytes: "512Mi".into(),
            memory_percent: "10%".into(),
        }]
    );
    assert_eq!(
        samples[0].to_string(),
        "n1: CPU=200m cores (5%%), Memory=512Mi bytes (10%%)"
    );
}

#[test]
fn real_output_keeps_tokens_verbatim() {
    let pods = parse_pod_report(PODS);
    assert_eq!(pods.len(), 3);
    assert_eq!(pods[1].name, "solver-7f9c8d6b5-qwz4t");
    assert_eq!(pods[1].cpu, "812m");
    assert_eq!(pods[1].memory, "402Mi");

    let nodes = parse_node_report(NODES);
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].cpu_cores, "1203m");
    assert_eq!(nodes[1].memory_percent, "24%");
}

#[test]
fn header_only_reports_are_empty() {
    assert!(parse_pod_report("NAME CPU(cores) MEMORY(bytes)\n").is_empty());
    assert!(parse_node_report("NAME CPU(cores) CPU% MEMORY(bytes) MEMORY%").is_empty());
    assert!(parse_pod_report("").is_empty());
}

#[test]
fn blank_lines_are_not_rows() {
    let parsed = parse_pod_report_detailed("NAME CPU MEM\n\npodA 5m 10Mi\n   \n");
    assert_eq!(parsed.samples.len(), 1);
    assert!(parsed.rejected.is_empty());
}

#[test]
fn malformed_rows_are_skipped_not_fatal() {
    let text = "NAME CPU MEM\npodA 5m 10Mi\nbroken 1m\npodB 7m 20Mi\n";
    let parsed = parse_pod_report_detailed(text);
    assert_eq!(parsed.samples.len(), 2);
    assert_eq!(parsed.samples[1].name, "podB");
    assert_eq!(parsed.rejected.len(), 1);
    assert!(parsed.rejected[0].to_string().starts_with("line 3:"));

    // node rows need five fields; a pod-shaped row is rejected
    let parsed = parse_node_report_detailed("NAME ...\nn1 200m 5%\nn2 100m 2% 1Gi 9%\n");
    assert_eq!(parsed.samples.len(), 1);
    assert_eq!(parsed.samples[0].name, "n2");
    assert_eq!(parsed.rejected.len(), 1);
}

#[test]
fn windows_line_endings() {
    let pods = parse_pod_report("NAME CPU MEM\r\npodA 5m 10Mi\r\n");
    assert_eq!(pods.len(), 1);
    assert_eq!(pods[0].memory, "10Mi");
}
