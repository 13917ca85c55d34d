use super::{
    execute, AnalysisError, Code, ExecutionContext, Frame, MethodSignature, Settings, Value,
};
use crate::jvm::class_graph::{ObjectHierarchy, TypeHierarchy};
use crate::jvm::BinaryName;
use crate::lookup::Lookups;
use std::collections::BTreeSet;
use std::ops::Range;

/// Runs every reachable instruction of a method body until the frames stop changing
///
/// ### Fixpoint
///
/// Each address has an entry frame: the merge of every frame flowing into it. An address is put
/// back on the worklist whenever its entry frame changes, so loops get re-executed with wider
/// values until they stabilize. Values only ever widen, and tracked array contents are dropped
/// as soon as two paths disagree on them, so this terminates. [`Settings::max_steps`] still
/// bounds the work in case it takes too long.
///
/// ### Control flow
///
/// Executors never look at labels. Here, successors are the next instruction (unless the
/// opcode never falls through), the resolved branch targets, and the handlers of every
/// try-catch block covering the instruction. An undefined label is a problem with the code
/// under analysis, not with the analyzer: the frame is marked wonky and the edge is dropped.
pub struct CodeExecutor<'a> {
    pub settings: Settings,
    pub lookups: Lookups,
    pub hierarchy: &'a dyn TypeHierarchy,
}

impl CodeExecutor<'static> {
    /// Executor with default settings, the built-in lookups, and no class hierarchy beyond
    /// `java.lang.Object`
    pub fn new() -> CodeExecutor<'static> {
        CodeExecutor::with_hierarchy(&ObjectHierarchy)
    }
}

impl Default for CodeExecutor<'static> {
    fn default() -> CodeExecutor<'static> {
        CodeExecutor::new()
    }
}

impl<'a> CodeExecutor<'a> {
    pub fn with_hierarchy(hierarchy: &'a dyn TypeHierarchy) -> CodeExecutor<'a> {
        CodeExecutor {
            settings: Settings::default(),
            lookups: Lookups::basic(),
            hierarchy,
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> CodeExecutor<'a> {
        self.settings = settings;
        self
    }

    pub fn with_lookups(mut self, lookups: Lookups) -> CodeExecutor<'a> {
        self.lookups = lookups;
        self
    }

    /// Analyze the body of a method, starting from its parameters
    pub fn run_method(
        &self,
        code: &Code,
        method: &MethodSignature,
    ) -> Result<Analysis, AnalysisError> {
        self.run(code, Frame::for_method(method), Some(method))
    }

    /// Analyze code starting from the given frame
    ///
    /// When `method` is given, return instructions are also checked against its return type.
    pub fn run(
        &self,
        code: &Code,
        initial: Frame,
        method: Option<&MethodSignature>,
    ) -> Result<Analysis, AnalysisError> {
        let mut analysis = Analysis {
            entry_frames: vec![None; code.len()],
            exit_frames: vec![None; code.len()],
            converged: true,
            steps: 0,
        };
        if code.is_empty() {
            return Ok(analysis);
        }
        let handlers = self.resolve_handlers(code);

        let mut worklist: BTreeSet<usize> = BTreeSet::new();
        analysis.entry_frames[0] = Some(initial);
        worklist.insert(0);

        while let Some(address) = worklist.iter().next().copied() {
            worklist.remove(&address);
            if let Some(max_steps) = self.settings.max_steps {
                if analysis.steps >= max_steps {
                    log::warn!(
                        "stopping analysis after {} steps without reaching a fixpoint",
                        analysis.steps
                    );
                    analysis.converged = false;
                    break;
                }
            }
            analysis.steps += 1;

            let entry = match &analysis.entry_frames[address] {
                Some(entry) => entry,
                None => continue,
            };
            let insn = &code.instructions[address];
            // Entry frames only carry diagnostics raised while merging into them
            let mut frame = entry.clone();

            let ctx = ExecutionContext {
                lookups: &self.lookups,
                settings: &self.settings,
                hierarchy: self.hierarchy,
                method,
                address,
            };
            log::trace!("{:>5}: {:<40} {:?}", address, insn.to_string(), frame.stack());
            execute(&mut frame, insn, &ctx).map_err(|kind| AnalysisError::Executor {
                address,
                instruction: insn.to_string(),
                kind,
            })?;
            log::trace!("{:>5}  {:<40} {:?}", "", "", frame.stack());

            // Where control goes next
            let mut successors = vec![];
            if !insn.opcode.ends_block() {
                if address + 1 < code.len() {
                    successors.push(address + 1);
                } else {
                    frame.mark_wonky("execution falls off the end of the code");
                }
            }
            for label in insn.branch_targets() {
                match code.resolve_label(label) {
                    Some(target) if target < code.len() => successors.push(target),
                    Some(_) => {
                        frame.mark_wonky(format!("{} jumps past the end of the code", label))
                    }
                    None => frame.mark_wonky(format!("label {} is not defined", label)),
                }
            }

            // Exceptions can be thrown before or after the instruction's effects on locals
            let mut handler_frames = vec![];
            for handler in handlers.iter().filter(|h| h.range.contains(&address)) {
                match handler.address {
                    Some(target) => {
                        for locals_from in [entry, &frame] {
                            let mut handler_frame = locals_from.clone();
                            handler_frame.clear_stack();
                            handler_frame.push(Value::Object(handler.exception_type.clone()));
                            handler_frames.push((target, handler_frame));
                        }
                    }
                    None => frame.mark_wonky(format!("handler {} is not defined", handler.label)),
                }
            }

            for target in successors {
                self.propagate(&mut analysis, &mut worklist, target, &frame);
            }
            for (target, handler_frame) in handler_frames {
                self.propagate(&mut analysis, &mut worklist, target, &handler_frame);
            }
            analysis.exit_frames[address] = Some(frame);
        }

        log::debug!(
            "analyzed {} instructions in {} steps ({} reachable)",
            code.len(),
            analysis.steps,
            analysis.reachable_count()
        );
        Ok(analysis)
    }

    /// Merge a frame into the entry frame of `target`, queueing it up if anything changed
    fn propagate(
        &self,
        analysis: &mut Analysis,
        worklist: &mut BTreeSet<usize>,
        target: usize,
        frame: &Frame,
    ) {
        let mut incoming = frame.clone();
        incoming.clear_diagnostics();
        let slot = &mut analysis.entry_frames[target];
        let changed = match slot {
            Some(existing) => existing.merge(&incoming, self.hierarchy),
            None => {
                *slot = Some(incoming);
                true
            }
        };
        if changed {
            worklist.insert(target);
        }
    }

    /// Resolve the labels of every try-catch block
    ///
    /// Blocks whose range can't be resolved protect nothing.
    fn resolve_handlers(&self, code: &Code) -> Vec<Handler> {
        let mut handlers = vec![];
        for try_catch in &code.try_catches {
            let start = code.resolve_label(&try_catch.start);
            let end = code.resolve_label(&try_catch.end);
            let (start, end) = match (start, end) {
                (Some(start), Some(end)) => (start, end),
                _ => {
                    log::warn!(
                        "ignoring try-catch block {}..{} with undefined labels",
                        try_catch.start,
                        try_catch.end
                    );
                    continue;
                }
            };
            handlers.push(Handler {
                range: start..end,
                label: try_catch.handler.clone(),
                address: code
                    .resolve_label(&try_catch.handler)
                    .filter(|address| *address < code.len()),
                exception_type: try_catch
                    .exception_type
                    .clone()
                    .unwrap_or(BinaryName::THROWABLE),
            });
        }
        handlers
    }
}

struct Handler {
    range: Range<usize>,
    label: String,
    address: Option<usize>,
    exception_type: BinaryName,
}

/// Frames computed for every instruction of a method body
#[derive(Debug, Clone)]
pub struct Analysis {
    entry_frames: Vec<Option<Frame>>,
    exit_frames: Vec<Option<Frame>>,
    converged: bool,
    steps: usize,
}

impl Analysis {
    /// Frame after executing the instruction at `address`
    ///
    /// Its diagnostics are the problems found by that instruction, and those found merging the
    /// paths that reach it. `None` if the instruction was never reached.
    pub fn frame(&self, address: usize) -> Option<&Frame> {
        self.exit_frames.get(address)?.as_ref()
    }

    /// Frame before executing the instruction at `address`, merged over every path reaching it
    pub fn entry_frame(&self, address: usize) -> Option<&Frame> {
        self.entry_frames.get(address)?.as_ref()
    }

    pub fn is_reachable(&self, address: usize) -> bool {
        self.frame(address).is_some()
    }

    /// Addresses of instructions no path reaches
    pub fn unreachable(&self) -> Vec<usize> {
        (0..self.exit_frames.len())
            .filter(|address| !self.is_reachable(*address))
            .collect()
    }

    fn reachable_count(&self) -> usize {
        self.exit_frames.iter().filter(|frame| frame.is_some()).count()
    }

    /// Did any executed instruction see something inconsistent?
    pub fn any_wonky(&self) -> bool {
        self.exit_frames.iter().flatten().any(Frame::is_wonky)
    }

    /// Every diagnostic, with the address of the instruction that raised it
    pub fn diagnostics(&self) -> Vec<(usize, &str)> {
        let mut diagnostics = vec![];
        for (address, frame) in self.exit_frames.iter().enumerate() {
            if let Some(frame) = frame {
                for diagnostic in frame.diagnostics() {
                    diagnostics.push((address, diagnostic.as_str()));
                }
            }
        }
        diagnostics
    }

    /// Was the fixpoint reached before running out of steps?
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Number of instructions executed, counting re-executions
    pub fn steps(&self) -> usize {
        self.steps
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::analysis::{Constant, Instruction, Opcode};
    use crate::jvm::class_graph::{ClassGraph, ClassGraphArenas};
    use crate::jvm::{BaseType, MethodAccessFlags, Name};

    fn body(build: impl FnOnce(&mut Code)) -> Code {
        let mut code = Code::new();
        build(&mut code);
        code
    }

    /// `i = 0; while (i < 10) i++; return i;`
    fn counting_loop() -> Code {
        body(|code| {
            code.push(Instruction::new(Opcode::IConst0));
            code.push(Instruction::variable(Opcode::IStore, "i"));
            code.label("loop");
            code.push(Instruction::variable(Opcode::ILoad, "i"));
            code.push(Instruction::int(Opcode::BiPush, 10));
            code.push(Instruction::jump(Opcode::IfICmpGe, "done"));
            code.push(Instruction::iinc("i", 1));
            code.push(Instruction::jump(Opcode::Goto, "loop"));
            code.label("done");
            code.push(Instruction::variable(Opcode::ILoad, "i"));
            code.push(Instruction::new(Opcode::IReturn));
        })
    }

    #[test]
    fn straight_line_code() {
        let code: Code = vec![
            Instruction::new(Opcode::IConst5),
            Instruction::new(Opcode::IConst3),
            Instruction::new(Opcode::IAdd),
            Instruction::new(Opcode::IReturn),
        ]
        .into_iter()
        .collect();
        let analysis = CodeExecutor::new().run(&code, Frame::new(), None).unwrap();
        assert_eq!(analysis.frame(2).unwrap().stack(), [Value::int(8)]);
        assert!(analysis.frame(3).unwrap().stack().is_empty());
        assert!(!analysis.any_wonky());
        assert!(analysis.converged());
        assert_eq!(analysis.steps(), 4);
    }

    #[test]
    fn loops_converge() {
        let analysis = CodeExecutor::new()
            .run(&counting_loop(), Frame::new(), None)
            .unwrap();
        assert!(analysis.converged());
        assert!(!analysis.any_wonky());

        let loop_head = analysis.entry_frame(2).unwrap();
        assert_eq!(loop_head.get_local("i"), Some(&Value::unknown(BaseType::Int)));
        assert_eq!(
            analysis.frame(7).unwrap().stack(),
            [Value::unknown(BaseType::Int)]
        );
    }

    #[test]
    fn step_limit() {
        let settings = Settings {
            max_steps: Some(5),
            ..Settings::default()
        };
        let analysis = CodeExecutor::new()
            .with_settings(settings)
            .run(&counting_loop(), Frame::new(), None)
            .unwrap();
        assert!(!analysis.converged());
        assert_eq!(analysis.steps(), 5);
        assert!(analysis.is_reachable(4));
        assert!(!analysis.is_reachable(5));
    }

    #[test]
    fn branches_merge() {
        // x = flag ? 5 : 7
        let code = body(|code| {
            code.push(Instruction::variable(Opcode::ILoad, "flag"));
            code.push(Instruction::jump(Opcode::IfEq, "else"));
            code.push(Instruction::new(Opcode::IConst5));
            code.push(Instruction::jump(Opcode::Goto, "end"));
            code.label("else");
            code.push(Instruction::int(Opcode::BiPush, 7));
            code.label("end");
            code.push(Instruction::new(Opcode::IReturn));
        });
        let initial = Frame::with_locals([("flag", Value::unknown(BaseType::Boolean))]);
        let analysis = CodeExecutor::new().run(&code, initial, None).unwrap();
        assert_eq!(
            analysis.entry_frame(5).unwrap().stack(),
            [Value::unknown(BaseType::Int)]
        );
        assert!(!analysis.any_wonky());
    }

    #[test]
    fn unreachable_code() {
        let code = body(|code| {
            code.push(Instruction::new(Opcode::Return));
            code.push(Instruction::new(Opcode::Nop));
            code.push(Instruction::new(Opcode::Return));
        });
        let analysis = CodeExecutor::new().run(&code, Frame::new(), None).unwrap();
        assert_eq!(analysis.unreachable(), [1, 2]);
        assert_eq!(analysis.frame(1), None);
    }

    #[test]
    fn bad_control_flow_is_wonky() {
        let code = body(|code| {
            code.push(Instruction::jump(Opcode::Goto, "nowhere"));
        });
        let analysis = CodeExecutor::new().run(&code, Frame::new(), None).unwrap();
        assert_eq!(
            analysis.diagnostics(),
            [(0, "label nowhere is not defined")]
        );

        let code = body(|code| {
            code.push(Instruction::new(Opcode::IConst0));
        });
        let analysis = CodeExecutor::new().run(&code, Frame::new(), None).unwrap();
        assert_eq!(
            analysis.diagnostics(),
            [(0, "execution falls off the end of the code")]
        );
    }

    #[test]
    fn wonky_frames_stay_wonky() {
        let code = body(|code| {
            code.push(Instruction::new(Opcode::Pop));
            code.push(Instruction::new(Opcode::IConst0));
            code.push(Instruction::new(Opcode::IReturn));
        });
        let analysis = CodeExecutor::new().run(&code, Frame::new(), None).unwrap();
        assert!(analysis.frame(2).unwrap().is_wonky());
        assert!(analysis.frame(2).unwrap().diagnostics().is_empty());
        assert_eq!(
            analysis.diagnostics(),
            [(0, "pop needs 1 stack slots, found 0"), (0, "stack underflow")]
        );
    }

    #[test]
    fn merge_problems_are_reported() {
        let code = body(|code| {
            code.push(Instruction::variable(Opcode::ILoad, "flag"));
            code.push(Instruction::jump(Opcode::IfEq, "join"));
            code.push(Instruction::new(Opcode::IConst1));
            code.label("join");
            code.push(Instruction::new(Opcode::IConst0));
            code.push(Instruction::new(Opcode::Return));
        });
        let initial = Frame::with_locals([("flag", Value::unknown(BaseType::Boolean))]);
        let analysis = CodeExecutor::new().run(&code, initial, None).unwrap();
        assert_eq!(
            analysis.frame(3).unwrap().diagnostics(),
            ["stack heights differ at merge point (0 and 1)"]
        );
        assert!(analysis.frame(2).unwrap().diagnostics().is_empty());
    }

    #[test]
    fn executor_errors_abort() {
        let code = body(|code| {
            code.push(Instruction::new(Opcode::Nop));
            code.push(Instruction::new(Opcode::Jsr));
        });
        let error = CodeExecutor::new()
            .run(&code, Frame::new(), None)
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "cannot execute `jsr` (at 1): unsupported instruction"
        );
    }

    #[test]
    fn exception_handlers() {
        // try { s = "a"; x = 1 / d; } catch (ArithmeticException e) { return e; }
        let mut code = body(|code| {
            code.label("start");
            code.push(Instruction::ldc(Constant::String("a".to_owned())));
            code.push(Instruction::variable(Opcode::AStore, "s"));
            code.push(Instruction::new(Opcode::IConst1));
            code.push(Instruction::variable(Opcode::ILoad, "d"));
            code.push(Instruction::new(Opcode::IDiv));
            code.push(Instruction::new(Opcode::IReturn));
            code.label("end");
            code.label("handler");
            code.push(Instruction::new(Opcode::AReturn));
        });
        code.add_try_catch("start", "end", "handler", Some("java/lang/ArithmeticException"))
            .unwrap();

        let initial = Frame::with_locals([("d", Value::unknown(BaseType::Int))]);
        let analysis = CodeExecutor::new().run(&code, initial, None).unwrap();
        let handler = analysis.entry_frame(6).unwrap();
        assert_eq!(
            handler.stack(),
            [Value::Object(BinaryName::ARITHMETICEXCEPTION)]
        );
        assert_eq!(handler.get_local("d"), Some(&Value::unknown(BaseType::Int)));

        // Only set along some of the paths into the handler
        assert_eq!(handler.get_local("s"), Some(&Value::string("a")));
        assert!(!analysis.any_wonky());
    }

    #[test]
    fn handlers_join_exception_types() {
        let arenas = ClassGraphArenas::new();
        let graph = ClassGraph::new(&arenas);
        graph.insert_java_library_types();

        let mut code = body(|code| {
            code.label("a");
            code.push(Instruction::new(Opcode::Nop));
            code.label("b");
            code.push(Instruction::new(Opcode::Nop));
            code.label("c");
            code.push(Instruction::new(Opcode::Return));
            code.label("handler");
            code.push(Instruction::new(Opcode::AThrow));
        });
        code.add_try_catch("a", "b", "handler", Some("java/lang/ArithmeticException"))
            .unwrap();
        code.add_try_catch("b", "c", "handler", Some("java/lang/IllegalArgumentException"))
            .unwrap();

        let analysis = CodeExecutor::with_hierarchy(&graph)
            .run(&code, Frame::new(), None)
            .unwrap();
        assert_eq!(
            analysis.entry_frame(3).unwrap().stack(),
            [Value::Object(BinaryName::RUNTIMEEXCEPTION)]
        );
    }

    #[test]
    fn methods_start_from_their_parameters() {
        let method =
            MethodSignature::new("com/example/Box", "scale", "(D)D", MethodAccessFlags::PUBLIC)
                .unwrap()
                .with_parameter_names(&["factor"]);
        let code = body(|code| {
            code.push(Instruction::variable(Opcode::DLoad, "factor"));
            code.push(Instruction::new(Opcode::DReturn));
            code.push(Instruction::variable(Opcode::ALoad, "this"));
            code.push(Instruction::new(Opcode::AReturn));
        });
        let analysis = CodeExecutor::new().run_method(&code, &method).unwrap();
        assert!(!analysis.any_wonky());
        let entry = analysis.entry_frame(0).unwrap();
        assert_eq!(
            entry.get_local("this"),
            Some(&Value::Object(BinaryName::from_str("com/example/Box").unwrap()))
        );
    }
}
