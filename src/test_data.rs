#[cfg(test)]
pub const POST_DATA_YAML: &str = r#"---
title: "Kubernetes Backup and Disaster Recovery"
date: 2023-05-01T10:00:00+08:00
draft: false
tags: ["kubernetes", "backup", "velero"]
categories: ["Kubernetes"]
author: "J. Doe"
description: "Strategies for backing up cluster state and persistent volumes"
more_link: "yes"
url: "/kubernetes-backup-dr/"
---

Backing up a cluster is more than copying etcd.

This post walks through *Velero*, etcd snapshots and volume snapshots.

<!--more-->

## Installing Velero

```bash
velero install --provider aws --bucket backups
```

Then schedule a daily backup:

```yaml
apiVersion: velero.io/v1
kind: Schedule
metadata:
  name: daily
```
"#;

#[cfg(test)]
pub const POST_DATA_TOML: &str = r#"+++
title = "Tracing syscalls with eBPF"
date = 2023-11-04T09:30:00-03:00
draft = false
tags = ["linux", "ebpf"]
categories = ["Linux"]
author = "J. Doe"
description = "A first look at bpftrace"
url = "/ebpf-syscalls/"
slug = "ebpf-syscalls"
+++

Counting syscalls per process:

~~~c
SEC("tracepoint/raw_syscalls/sys_enter")
int count(void *ctx) { return 0; }
~~~
"#;
