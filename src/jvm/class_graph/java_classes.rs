use super::{BinaryName, ClassAccessFlags, ClassData, ClassGraph};
use elsa::FrozenVec;

/// Classes inside `java.*`
pub struct JavaClasses<'g> {
    pub lang: LangClasses<'g>,
    pub io: IoClasses<'g>,
    pub util: UtilClasses<'g>,
}

/// Classes inside `java.lang.*`
pub struct LangClasses<'g> {
    pub object: &'g ClassData<'g>,
    pub char_sequence: &'g ClassData<'g>,
    pub comparable: &'g ClassData<'g>,
    pub iterable: &'g ClassData<'g>,
    pub cloneable: &'g ClassData<'g>,
    pub string: &'g ClassData<'g>,
    pub class: &'g ClassData<'g>,
    pub number: &'g ClassData<'g>,
    pub byte: &'g ClassData<'g>,
    pub short: &'g ClassData<'g>,
    pub character: &'g ClassData<'g>,
    pub integer: &'g ClassData<'g>,
    pub long: &'g ClassData<'g>,
    pub float: &'g ClassData<'g>,
    pub double: &'g ClassData<'g>,
    pub boolean: &'g ClassData<'g>,
    pub void: &'g ClassData<'g>,
    pub math: &'g ClassData<'g>,
    pub strict_math: &'g ClassData<'g>,
    pub system: &'g ClassData<'g>,
    pub invoke: InvokeClasses<'g>,
    pub throwable: &'g ClassData<'g>,
    pub error: &'g ClassData<'g>,
    pub exception: &'g ClassData<'g>,
    pub runtime_exception: &'g ClassData<'g>,
    pub arithmetic_exception: &'g ClassData<'g>,
    pub illegal_argument_exception: &'g ClassData<'g>,
    pub number_format_exception: &'g ClassData<'g>,
    pub illegal_state_exception: &'g ClassData<'g>,
    pub null_pointer_exception: &'g ClassData<'g>,
    pub index_out_of_bounds_exception: &'g ClassData<'g>,
}

/// Classes inside `java.lang.invoke.*`
pub struct InvokeClasses<'g> {
    pub method_type: &'g ClassData<'g>,
    pub method_handle: &'g ClassData<'g>,
    pub call_site: &'g ClassData<'g>,
}

/// Classes inside `java.io.*`
pub struct IoClasses<'g> {
    pub serializable: &'g ClassData<'g>,
    pub io_exception: &'g ClassData<'g>,
}

/// Classes inside `java.util.*`
pub struct UtilClasses<'g> {
    pub collection: &'g ClassData<'g>,
    pub list: &'g ClassData<'g>,
    pub set: &'g ClassData<'g>,
    pub map: &'g ClassData<'g>,
    pub random_access: &'g ClassData<'g>,
    pub abstract_collection: &'g ClassData<'g>,
    pub abstract_list: &'g ClassData<'g>,
    pub abstract_set: &'g ClassData<'g>,
    pub abstract_map: &'g ClassData<'g>,
    pub array_list: &'g ClassData<'g>,
    pub linked_list: &'g ClassData<'g>,
    pub hash_set: &'g ClassData<'g>,
    pub hash_map: &'g ClassData<'g>,
}

impl<'g> JavaClasses<'g> {
    pub fn add_to_graph(class_graph: &ClassGraph<'g>) -> JavaClasses<'g> {
        let lang = LangClasses::add_to_graph(class_graph);
        let io = IoClasses::add_to_graph(class_graph, &lang);
        let util = UtilClasses::add_to_graph(class_graph, &lang);

        JavaClasses { lang, io, util }
    }
}

fn final_class() -> ClassAccessFlags {
    ClassAccessFlags::class() | ClassAccessFlags::FINAL
}

impl<'g> LangClasses<'g> {
    pub fn add_to_graph(class_graph: &ClassGraph<'g>) -> LangClasses<'g> {
        let object = class_graph.add_class(ClassData {
            name: BinaryName::OBJECT,
            superclass: None,
            interfaces: FrozenVec::new(),
            access_flags: ClassAccessFlags::class(),
        });

        let interface =
            |name: BinaryName| ClassData::new(name, object, ClassAccessFlags::interface());
        let char_sequence = class_graph.add_class(interface(BinaryName::CHARSEQUENCE));
        let comparable = class_graph.add_class(interface(BinaryName::COMPARABLE));
        let iterable = class_graph.add_class(interface(BinaryName::ITERABLE));
        let cloneable = class_graph.add_class(interface(BinaryName::CLONEABLE));

        let string = class_graph.add_class_implementing(
            ClassData::new(BinaryName::STRING, object, final_class()),
            &[char_sequence, comparable],
        );
        let class = class_graph.add_class(ClassData::new(BinaryName::CLASS, object, final_class()));
        let number = class_graph.add_class(ClassData::new(
            BinaryName::NUMBER,
            object,
            ClassAccessFlags::class() | ClassAccessFlags::ABSTRACT,
        ));
        let boxed = |name: BinaryName, superclass: &'g ClassData<'g>| {
            class_graph.add_class_implementing(
                ClassData::new(name, superclass, final_class()),
                &[comparable],
            )
        };
        let byte = boxed(BinaryName::BYTE, number);
        let short = boxed(BinaryName::SHORT, number);
        let integer = boxed(BinaryName::INTEGER, number);
        let long = boxed(BinaryName::LONG, number);
        let float = boxed(BinaryName::FLOAT, number);
        let double = boxed(BinaryName::DOUBLE, number);
        let character = boxed(BinaryName::CHARACTER, object);
        let boolean = boxed(BinaryName::BOOLEAN, object);
        let void = class_graph.add_class(ClassData::new(BinaryName::VOID, object, final_class()));
        let math = class_graph.add_class(ClassData::new(BinaryName::MATH, object, final_class()));
        let strict_math =
            class_graph.add_class(ClassData::new(BinaryName::STRICTMATH, object, final_class()));
        let system =
            class_graph.add_class(ClassData::new(BinaryName::SYSTEM, object, final_class()));
        let invoke = InvokeClasses::add_to_graph(class_graph, object);

        let subclass = |name: BinaryName, superclass: &'g ClassData<'g>| {
            class_graph.add_class(ClassData::new(name, superclass, ClassAccessFlags::class()))
        };
        let throwable = subclass(BinaryName::THROWABLE, object);
        let error = subclass(BinaryName::ERROR, throwable);
        let exception = subclass(BinaryName::EXCEPTION, throwable);
        let runtime_exception = subclass(BinaryName::RUNTIMEEXCEPTION, exception);
        let arithmetic_exception = subclass(BinaryName::ARITHMETICEXCEPTION, runtime_exception);
        let illegal_argument_exception =
            subclass(BinaryName::ILLEGALARGUMENTEXCEPTION, runtime_exception);
        let number_format_exception =
            subclass(BinaryName::NUMBERFORMATEXCEPTION, illegal_argument_exception);
        let illegal_state_exception =
            subclass(BinaryName::ILLEGALSTATEEXCEPTION, runtime_exception);
        let null_pointer_exception =
            subclass(BinaryName::NULLPOINTEREXCEPTION, runtime_exception);
        let index_out_of_bounds_exception =
            subclass(BinaryName::INDEXOUTOFBOUNDSEXCEPTION, runtime_exception);

        LangClasses {
            object,
            char_sequence,
            comparable,
            iterable,
            cloneable,
            string,
            class,
            number,
            byte,
            short,
            character,
            integer,
            long,
            float,
            double,
            boolean,
            void,
            math,
            strict_math,
            system,
            invoke,
            throwable,
            error,
            exception,
            runtime_exception,
            arithmetic_exception,
            illegal_argument_exception,
            number_format_exception,
            illegal_state_exception,
            null_pointer_exception,
            index_out_of_bounds_exception,
        }
    }
}

impl<'g> InvokeClasses<'g> {
    pub fn add_to_graph(
        class_graph: &ClassGraph<'g>,
        object: &'g ClassData<'g>,
    ) -> InvokeClasses<'g> {
        let abstract_class = ClassAccessFlags::class() | ClassAccessFlags::ABSTRACT;
        let method_type = class_graph.add_class(ClassData::new(
            BinaryName::METHODTYPE,
            object,
            final_class(),
        ));
        let method_handle = class_graph.add_class(ClassData::new(
            BinaryName::METHODHANDLE,
            object,
            abstract_class,
        ));
        let call_site = class_graph.add_class(ClassData::new(
            BinaryName::CALLSITE,
            object,
            abstract_class,
        ));

        InvokeClasses {
            method_type,
            method_handle,
            call_site,
        }
    }
}

impl<'g> IoClasses<'g> {
    pub fn add_to_graph(class_graph: &ClassGraph<'g>, lang: &LangClasses<'g>) -> IoClasses<'g> {
        let serializable = class_graph.add_class(ClassData::new(
            BinaryName::SERIALIZABLE,
            lang.object,
            ClassAccessFlags::interface(),
        ));
        let io_exception = class_graph.add_class(ClassData::new(
            BinaryName::IOEXCEPTION,
            lang.exception,
            ClassAccessFlags::class(),
        ));

        IoClasses {
            serializable,
            io_exception,
        }
    }
}

impl<'g> UtilClasses<'g> {
    pub fn add_to_graph(
        class_graph: &ClassGraph<'g>,
        lang: &LangClasses<'g>,
    ) -> UtilClasses<'g> {
        let object = lang.object;
        let interface =
            |name: BinaryName| ClassData::new(name, object, ClassAccessFlags::interface());
        let abstract_class = ClassAccessFlags::class() | ClassAccessFlags::ABSTRACT;

        let collection = class_graph
            .add_class_implementing(interface(BinaryName::COLLECTION), &[lang.iterable]);
        let list = class_graph.add_class_implementing(interface(BinaryName::LIST), &[collection]);
        let set = class_graph.add_class_implementing(interface(BinaryName::SET), &[collection]);
        let map = class_graph.add_class(interface(BinaryName::MAP));
        let random_access = class_graph.add_class(interface(BinaryName::RANDOMACCESS));

        let abstract_collection = class_graph.add_class_implementing(
            ClassData::new(BinaryName::ABSTRACTCOLLECTION, object, abstract_class),
            &[collection],
        );
        let abstract_list = class_graph.add_class_implementing(
            ClassData::new(BinaryName::ABSTRACTLIST, abstract_collection, abstract_class),
            &[list],
        );
        let abstract_set = class_graph.add_class_implementing(
            ClassData::new(BinaryName::ABSTRACTSET, abstract_collection, abstract_class),
            &[set],
        );
        let abstract_map = class_graph.add_class_implementing(
            ClassData::new(BinaryName::ABSTRACTMAP, object, abstract_class),
            &[map],
        );
        let array_list = class_graph.add_class_implementing(
            ClassData::new(BinaryName::ARRAYLIST, abstract_list, ClassAccessFlags::class()),
            &[list, random_access],
        );
        let linked_list = class_graph.add_class_implementing(
            ClassData::new(BinaryName::LINKEDLIST, abstract_list, ClassAccessFlags::class()),
            &[list],
        );
        let hash_set = class_graph.add_class_implementing(
            ClassData::new(BinaryName::HASHSET, abstract_set, ClassAccessFlags::class()),
            &[set],
        );
        let hash_map = class_graph.add_class_implementing(
            ClassData::new(BinaryName::HASHMAP, abstract_map, ClassAccessFlags::class()),
            &[map],
        );

        UtilClasses {
            collection,
            list,
            set,
            map,
            random_access,
            abstract_collection,
            abstract_list,
            abstract_set,
            abstract_map,
            array_list,
            linked_list,
            hash_set,
            hash_map,
        }
    }
}
